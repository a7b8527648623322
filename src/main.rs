use clap::Parser;
use tracing_subscriber::EnvFilter;
use voicedesk::cli::{
    handle_agents_list, handle_agents_show, handle_clients_list, handle_draft_reset,
    handle_draft_set, handle_draft_show, handle_init, handle_login, handle_logout,
    handle_numbers_assign, handle_numbers_list, handle_prompts, handle_whoami,
    handle_wizard_next, handle_wizard_prompt, handle_wizard_start, handle_wizard_submit,
    AgentsAction, Cli, ClientsAction, Commands, DraftAction, NumbersAction, WizardAction,
};

fn init_tracing(verbose: bool) {
    let default = if verbose { "voicedesk=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init { api_url } => handle_init(api_url),
        Commands::Login {
            id,
            email,
            name,
            role,
            json,
        } => handle_login(id, email, name, role, json),
        Commands::Logout => handle_logout(),
        Commands::Whoami { json } => handle_whoami(json),
        Commands::Prompts { inbound, json } => handle_prompts(inbound, json).await,
        Commands::Clients(cmd) => match cmd.action {
            ClientsAction::List { json } => handle_clients_list(json).await,
        },
        Commands::Agents(cmd) => match cmd.action {
            AgentsAction::List {
                search,
                pages,
                json,
            } => handle_agents_list(search, pages, json).await,
            AgentsAction::Show { id, json } => handle_agents_show(id, json).await,
        },
        Commands::Draft(cmd) => match cmd.action {
            DraftAction::Show { json } => handle_draft_show(json),
            DraftAction::Set { field, value } => handle_draft_set(field, value),
            DraftAction::Reset => handle_draft_reset(),
        },
        Commands::Wizard(cmd) => match cmd.action {
            WizardAction::Start { agent_id } => handle_wizard_start(agent_id).await,
            WizardAction::Next { route } => handle_wizard_next(route),
            WizardAction::Prompt { route, id } => handle_wizard_prompt(route, id).await,
            WizardAction::Submit { route, json } => handle_wizard_submit(route, json).await,
        },
        Commands::Numbers(cmd) => match cmd.action {
            NumbersAction::List {
                query,
                interactive,
                json,
            } => handle_numbers_list(query, interactive, json).await,
            NumbersAction::Assign {
                number_id,
                target,
                id,
                remove,
                update,
                from,
                yes,
                json,
            } => handle_numbers_assign(number_id, target, id, remove, update, from, yes, json).await,
        },
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}
