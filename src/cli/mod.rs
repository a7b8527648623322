mod commands;
mod handlers;

pub use commands::{
    AgentsAction, AgentsCommand, AssignTargetArg, Cli, ClientsAction, ClientsCommand, Commands,
    DraftAction, DraftCommand, NumbersAction, NumbersCommand, WizardAction, WizardCommand,
};
pub use handlers::{
    handle_agents_list, handle_agents_show, handle_clients_list, handle_draft_reset,
    handle_draft_set, handle_draft_show, handle_init, handle_login, handle_logout,
    handle_numbers_assign, handle_numbers_list, handle_prompts, handle_whoami,
    handle_wizard_next, handle_wizard_prompt, handle_wizard_start, handle_wizard_submit,
};
