use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "voicedesk")]
#[command(version, about = "Manage AI voice agents and phone numbers from the terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a voicedesk project in the current directory
    Init {
        /// Backend API base URL
        #[arg(long, env = "VOICEDESK_API_URL")]
        api_url: Option<String>,
    },

    /// Record the logged-in user
    Login {
        /// User id
        #[arg(long)]
        id: i64,

        #[arg(long)]
        email: String,

        #[arg(long)]
        name: Option<String>,

        /// admin or client
        #[arg(long, default_value = "client")]
        role: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the logged-in user
    Logout,

    /// Show the logged-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List premade prompts
    Prompts {
        /// Prompts for inbound agents
        #[arg(long)]
        inbound: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Client businesses
    Clients(ClientsCommand),

    /// Voice agents
    Agents(AgentsCommand),

    /// The in-progress agent draft
    Draft(DraftCommand),

    /// Step through agent creation or editing
    Wizard(WizardCommand),

    /// Purchased phone numbers
    Numbers(NumbersCommand),
}

#[derive(Args, Debug)]
pub struct ClientsCommand {
    #[command(subcommand)]
    pub action: ClientsAction,
}

#[derive(Subcommand, Debug)]
pub enum ClientsAction {
    /// List clients available in the dropdown
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct AgentsCommand {
    #[command(subcommand)]
    pub action: AgentsAction,
}

#[derive(Subcommand, Debug)]
pub enum AgentsAction {
    /// List agents, loading pages as they are scrolled into view
    List {
        /// Search text
        #[arg(long, short = 's', default_value = "")]
        search: String,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one agent
    Show {
        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct DraftCommand {
    #[command(subcommand)]
    pub action: DraftAction,
}

#[derive(Subcommand, Debug)]
pub enum DraftAction {
    /// Print the draft
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set one field (name, isInbound, selectedVoice, language, client,
    /// initialMessage, prompt, premadePrompt, taskPrompt)
    Set { field: String, value: String },

    /// Restore every field to its default
    Reset,
}

#[derive(Args, Debug)]
pub struct WizardCommand {
    #[command(subcommand)]
    pub action: WizardAction,
}

#[derive(Subcommand, Debug)]
pub enum WizardAction {
    /// Print the first step route; with --agent-id, load the agent for editing
    Start {
        #[arg(long)]
        agent_id: Option<i64>,
    },

    /// Print the route of the step after ROUTE
    Next { route: String },

    /// Pick a premade prompt on the prompt step
    Prompt {
        route: String,

        /// Premade prompt id
        id: i64,
    },

    /// Validate the draft and save the agent
    Submit {
        route: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct NumbersCommand {
    #[command(subcommand)]
    pub action: NumbersAction,
}

#[derive(Subcommand, Debug)]
pub enum NumbersAction {
    /// List purchased numbers
    List {
        /// Search text with optional client:, status: and page: filters
        #[arg(default_value = "")]
        query: String,

        /// Read search text line by line from stdin, refetching as it settles
        #[arg(long, short = 'i')]
        interactive: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assign a number to a client or agent
    Assign {
        number_id: i64,

        /// What to assign
        #[arg(long, value_enum, default_value = "client")]
        target: AssignTargetArg,

        /// Client or agent id
        #[arg(required_unless_present = "remove")]
        id: Option<i64>,

        /// Remove the current assignment instead
        #[arg(long, conflicts_with_all = ["id", "update"])]
        remove: bool,

        /// Replace an existing assignment
        #[arg(long)]
        update: bool,

        /// Flow the assignment was started from, e.g. business-approval
        #[arg(long)]
        from: Option<String>,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignTargetArg {
    Client,
    Agent,
}
