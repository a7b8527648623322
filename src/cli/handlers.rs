use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use super::commands::AssignTargetArg;
use crate::api::{resources, ApiClient};
use crate::assign::{AssignTarget, AssignmentFlow, ModalType, NavigationContext};
use crate::cache::{InfiniteList, ListParams, ListView};
use crate::catalog;
use crate::config::{find_project_dir, Config, PROJECT_DIR};
use crate::context::AppContext;
use crate::debounce::Debouncer;
use crate::draft::{select_premade_prompt, DraftValue, PromptSource};
use crate::entity::{Agent, Page, PurchasedNumber, Role, User, PAGE_SIZE};
use crate::error::{DeskError, Result};
use crate::search::parse_list_query;
use crate::storage::SqliteStore;
use crate::wizard::{self, Mode, Step, WizardController, WizardRoute};

/// Find `.voicedesk/` in the current directory or one of its parents.
fn find_project() -> Result<PathBuf> {
    let cwd = env::current_dir()?;
    find_project_dir(&cwd).ok_or(DeskError::NotInitialized)
}

fn open_context() -> Result<AppContext> {
    let dir = find_project()?;
    let config = Config::load(&dir)?;
    let storage = Arc::new(SqliteStore::open(&dir)?);
    let backend = Arc::new(ApiClient::from_config(&config)?);
    AppContext::new(backend, storage, config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn handle_init(api_url: Option<String>) -> Result<()> {
    let root = env::current_dir()?;
    let dir = root.join(PROJECT_DIR);
    if dir.exists() {
        return Err(DeskError::AlreadyInitialized);
    }

    let mut config = Config::default();
    if let Some(url) = api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    config.validate()?;

    fs::create_dir_all(&dir)?;
    config.save(&dir)?;
    SqliteStore::open(&dir)?;

    println!("Initialized voicedesk project in {}", root.display());
    println!("  API: {}", config.api_url);
    Ok(())
}

pub fn handle_login(
    id: i64,
    email: String,
    name: Option<String>,
    role: String,
    json: bool,
) -> Result<()> {
    let ctx = open_context()?;
    let role: Role = role.parse().map_err(|_| DeskError::InvalidValue {
        field: "role".to_string(),
        value: role.clone(),
    })?;
    let user = User {
        id,
        email,
        name,
        role,
    };
    ctx.auth.set_user(user.clone())?;

    if json {
        print_json(&user)?;
    } else {
        println!("Logged in as {} ({})", user.email, user.role);
    }
    Ok(())
}

pub fn handle_logout() -> Result<()> {
    let ctx = open_context()?;
    ctx.auth.clear()?;
    println!("Logged out.");
    Ok(())
}

pub fn handle_whoami(json: bool) -> Result<()> {
    let ctx = open_context()?;
    let user = ctx.auth.user()?.ok_or(DeskError::NotLoggedIn)?;
    if json {
        print_json(&user)?;
    } else {
        match &user.name {
            Some(name) => println!("{} <{}>", name, user.email),
            None => println!("{}", user.email),
        }
        println!("  role: {}", user.role);
    }
    Ok(())
}

pub async fn handle_prompts(inbound: bool, json: bool) -> Result<()> {
    let ctx = open_context()?;
    let prompts = wizard::load_catalog(&ctx, inbound).await?;
    if json {
        return print_json(&prompts);
    }

    let kind = if inbound { "inbound" } else { "outbound" };
    println!("Premade prompts ({}):\n", kind);
    for p in prompts {
        println!("  {:>3}  {}", p.id, p.title);
    }
    Ok(())
}

pub async fn handle_clients_list(json: bool) -> Result<()> {
    let ctx = open_context()?;
    let clients = wizard::load_clients(&ctx).await?;
    if json {
        print_json(&clients)?;
    } else if clients.is_empty() {
        println!("No clients found.");
    } else {
        println!("Clients:\n");
        for c in clients {
            println!("  {:>4}  {}", c.value, c.label);
        }
    }
    Ok(())
}

fn agent_line(agent: &Agent) -> String {
    let direction = if agent.is_inbound { "inbound" } else { "outbound" };
    let mut line = format!("  {:>4}  {} [{}]", agent.id, agent.name, direction);
    if !agent.language.is_empty() {
        line.push_str(&format!(" {}", agent.language));
    }
    if let Some(client) = &agent.client_name {
        line.push_str(&format!(" - {}", client));
    }
    line
}

async fn fetch_agents(ctx: &AppContext, params: ListParams) -> Result<Vec<Agent>> {
    let key = params.cache_key(resources::AGENTS);
    let page: Page<Agent> = ctx
        .cache
        .fetch(&key, || async {
            ctx.backend
                .list_agents(&params)
                .await
                .map_err(DeskError::from)
        })
        .await?;
    Ok(page.items)
}

pub async fn handle_agents_list(search: String, pages: u32, json: bool) -> Result<()> {
    let ctx = open_context()?;
    let mut list: InfiniteList<Agent> = InfiniteList::new(PAGE_SIZE);

    for _ in 0..pages.max(1) {
        let search = search.clone();
        let loaded = list
            .load_more(|page, page_size| {
                let params = ListParams {
                    search,
                    page,
                    page_size,
                    ..ListParams::default()
                };
                fetch_agents(&ctx, params)
            })
            .await?;
        if !loaded {
            break;
        }
    }

    if json {
        return print_json(&list.items());
    }
    if list.items().is_empty() {
        println!("No agents found.");
        return Ok(());
    }
    println!("Agents:\n");
    for agent in list.items() {
        println!("{}", agent_line(agent));
    }
    if list.has_more() {
        println!("\nMore agents available, load them with --pages.");
    }
    Ok(())
}

pub async fn handle_agents_show(id: i64, json: bool) -> Result<()> {
    let ctx = open_context()?;
    let agent = ctx.backend.get_agent(id).await?;
    if json {
        return print_json(&agent);
    }

    println!("{}", agent_line(&agent));
    println!("  voice: {} ({})", agent.voice_name, agent.voice_model);
    println!("  prompt: {}", agent.prompts_title);
    println!("  initial message: {}", agent.initial_message);
    Ok(())
}

pub fn handle_draft_show(json: bool) -> Result<()> {
    let ctx = open_context()?;
    let draft = ctx.draft.snapshot();
    if json {
        return print_json(&draft);
    }

    let or_unset = |s: &str| {
        if s.is_empty() {
            "(unset)".to_string()
        } else {
            s.to_string()
        }
    };
    println!("name:            {}", or_unset(&draft.name));
    println!("isInbound:       {}", draft.is_inbound);
    match &draft.selected_voice {
        Some(v) => println!("selectedVoice:   {} ({}, {})", v.voice_name, v.voice_id, v.provider),
        None => println!("selectedVoice:   (unset)"),
    }
    println!("language:        {}", or_unset(&draft.language));
    match &draft.client {
        Some(c) => println!("client:          {} ({})", c.label, c.value),
        None => println!("client:          (unset)"),
    }
    println!("initialMessage:  {}", or_unset(&draft.initial_message));
    match draft.premade_prompt_id {
        Some(id) => println!("premadePrompt:   {}", id),
        None => println!("premadePrompt:   (unset)"),
    }
    println!("prompt:          {}", or_unset(&draft.prompt));
    println!("taskPrompt:      {}", or_unset(&draft.task_prompt));
    if let Some(id) = ctx.draft.hydrated_for() {
        println!("\nEditing agent {}", id);
    }
    Ok(())
}

pub fn handle_draft_set(field: String, value: String) -> Result<()> {
    let ctx = open_context()?;
    ctx.draft.set(DraftValue::parse(&field, &value)?)?;
    println!("Set {}", field);
    Ok(())
}

pub fn handle_draft_reset() -> Result<()> {
    let ctx = open_context()?;
    ctx.draft.reset()?;
    println!("Draft reset.");
    Ok(())
}

pub async fn handle_wizard_start(agent_id: Option<i64>) -> Result<()> {
    let ctx = open_context()?;
    let role = ctx.auth.role()?;
    let mode = agent_id.map_or(Mode::Create, Mode::Edit);
    let mut wizard = WizardController::new(role, mode);

    match mode {
        Mode::Create => ctx.draft.reset()?,
        Mode::Edit(id) => {
            let agent = ctx.backend.get_agent(id).await?;
            let clients = match role {
                Role::Admin => wizard::load_clients(&ctx).await?,
                Role::Client => Vec::new(),
            };
            ctx.draft.hydrate_from_entity(&agent, &clients)?;
            wizard.set_is_inbound(agent.is_inbound);
            wizard.set_prompts_title(Some(agent.prompts_title));
        }
    }

    println!("{}", wizard.route());
    Ok(())
}

pub fn handle_wizard_next(route: String) -> Result<()> {
    let ctx = open_context()?;
    let mut wizard = WizardController::resume(&WizardRoute::parse(&route)?)?;

    // The type step writes isInbound into the draft; later steps read it from the route.
    if wizard.current() == Step::AgentType || wizard.is_inbound().is_none() {
        wizard.set_is_inbound(ctx.draft.snapshot().is_inbound);
    }
    let next = wizard.advance()?;
    println!("{}", next);
    Ok(())
}

pub async fn handle_wizard_prompt(route: String, id: i64) -> Result<()> {
    let ctx = open_context()?;
    let mut wizard = WizardController::resume(&WizardRoute::parse(&route)?)?;
    if wizard.current() != Step::Prompt {
        return Err(DeskError::NotOnPromptStep(wizard.current().to_string()));
    }

    let is_inbound = wizard
        .is_inbound()
        .unwrap_or_else(|| ctx.draft.snapshot().is_inbound);
    let prompts = wizard::load_catalog(&ctx, is_inbound).await?;
    let original = match wizard.mode() {
        Mode::Edit(agent_id) => Some(ctx.backend.get_agent(agent_id).await?),
        Mode::Create => None,
    };

    let mode = wizard.mode();
    let source = select_premade_prompt(
        &ctx.draft,
        ctx.backend.as_ref(),
        &prompts,
        id,
        &mode,
        original.as_ref(),
    )
    .await?;
    wizard.set_prompts_title(catalog::title_for(&prompts, id).map(str::to_string));

    match source {
        PromptSource::Saved { .. } => eprintln!("Kept the saved prompt text."),
        PromptSource::Template(_) => eprintln!("Loaded prompt template {}.", id),
    }
    println!("{}", wizard.route());
    Ok(())
}

pub async fn handle_wizard_submit(route: String, json: bool) -> Result<()> {
    let ctx = open_context()?;
    let wizard = WizardController::resume(&WizardRoute::parse(&route)?)?;
    let outcome = wizard::submit(&ctx, &wizard).await?;

    if json {
        return print_json(&outcome.agent);
    }
    let verb = match wizard.mode() {
        Mode::Create => "Created",
        Mode::Edit(_) => "Updated",
    };
    println!("{} agent {} - {}", verb, outcome.agent.id, outcome.agent.name);
    println!("Next: {}", outcome.redirect);
    Ok(())
}

async fn fetch_numbers(ctx: &AppContext, params: ListParams) -> Result<Page<PurchasedNumber>> {
    ctx.backend
        .list_purchased_numbers(&params)
        .await
        .map_err(DeskError::from)
}

async fn load_numbers(ctx: &AppContext, view: &mut ListView<PurchasedNumber>) -> Result<()> {
    view.load(&ctx.cache, |params| fetch_numbers(ctx, params))
        .await?;

    // A page past the end is pulled back to the last one.
    let total = view.total_pages();
    if total > 0 && view.params().page > total {
        view.set_page(total);
        view.load(&ctx.cache, |params| fetch_numbers(ctx, params))
            .await?;
    }
    Ok(())
}

fn print_numbers(view: &ListView<PurchasedNumber>, json: bool) -> Result<()> {
    if json {
        return match view.page() {
            Some(page) => print_json(page),
            None => print_json(&Vec::<PurchasedNumber>::new()),
        };
    }
    if view.items().is_empty() {
        println!("No numbers found.");
        return Ok(());
    }

    for n in view.items() {
        let client = n.client_name.as_deref().unwrap_or("-");
        let agent = n.agent_name.as_deref().unwrap_or("-");
        let status = n.status.as_deref().unwrap_or("");
        println!(
            "  {:>4}  {:<16} client: {:<20} agent: {:<20} {}",
            n.id, n.phone_number, client, agent, status
        );
    }
    println!("\nPage {} of {}", view.params().page, view.total_pages());
    Ok(())
}

fn apply_query(view: &mut ListView<PurchasedNumber>, raw: &str) {
    let params = parse_list_query(raw);
    view.set_search(&params.search);
    view.set_client_filter(params.client);
    view.set_status_filter(params.status);
    if params.page > 1 {
        view.set_page(params.page);
    }
}

pub async fn handle_numbers_list(query: String, interactive: bool, json: bool) -> Result<()> {
    let ctx = open_context()?;
    let mut view: ListView<PurchasedNumber> =
        ListView::with_params(resources::PURCHASED_NUMBERS, parse_list_query(&query));

    if !interactive {
        load_numbers(&ctx, &mut view).await?;
        return print_numbers(&view, json);
    }

    let (mut debouncer, mut settled) = Debouncer::new(ctx.config.debounce());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(text) => debouncer.push(text),
                None => {
                    if debouncer.is_pending() {
                        if let Some(text) = settled.recv().await {
                            apply_query(&mut view, &text);
                            load_numbers(&ctx, &mut view).await?;
                            print_numbers(&view, json)?;
                        }
                    }
                    break;
                }
            },
            Some(text) = settled.recv() => {
                apply_query(&mut view, &text);
                load_numbers(&ctx, &mut view).await?;
                print_numbers(&view, json)?;
            }
        }
    }
    Ok(())
}

/// Ask on the terminal. Without a terminal the caller must pass --yes.
fn confirm(modal_type: ModalType, number_id: i64) -> Result<bool> {
    eprintln!("{}", modal_type.title());
    eprint!("{} (number {}) [y/N] ", modal_type.message(), number_id);

    if !atty::is(atty::Stream::Stdin) {
        eprintln!();
        return Err(DeskError::ConfirmationRequired);
    }
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

#[allow(clippy::too_many_arguments)]
pub async fn handle_numbers_assign(
    number_id: i64,
    target: AssignTargetArg,
    id: Option<i64>,
    remove: bool,
    update: bool,
    from: Option<String>,
    yes: bool,
    json: bool,
) -> Result<()> {
    let ctx = open_context()?;
    let role = ctx.auth.role()?;
    let target = match target {
        AssignTargetArg::Client => AssignTarget::Client,
        AssignTargetArg::Agent => AssignTarget::Agent,
    };
    let modal_type = if remove {
        ModalType::Delete
    } else if update {
        ModalType::Update
    } else {
        ModalType::New
    };

    let mut flow = AssignmentFlow::new(role, target, NavigationContext::from_flag(from.as_deref()));
    flow.select(number_id, id)?;
    flow.open(modal_type)?;

    if !yes && !confirm(modal_type, number_id)? {
        flow.cancel()?;
        println!("Cancelled.");
        return Ok(());
    }

    let outcome = flow.confirm(ctx.backend.as_ref(), &ctx.cache).await?;
    if json {
        print_json(&outcome.number)?;
    } else {
        println!(
            "{}: {} ({})",
            modal_type.confirm_label(),
            outcome.number.phone_number,
            outcome.number.id
        );
    }
    if let Some(redirect) = outcome.redirect {
        eprintln!("Next: {}", redirect);
    }
    Ok(())
}
