use super::{Step, WizardController};
use crate::api::resources;
use crate::cache::CacheKey;
use crate::catalog;
use crate::context::AppContext;
use crate::entity::{resolve_default_llm, Agent, ClientOption, LlmModel, PremadePrompt};
use crate::error::{DeskError, Result};
use crate::payload::{assemble, Lookups};

/// Clients fetched per request when filling the dropdown.
const DROPDOWN_PAGE_SIZE: u32 = 100;
const MAX_DROPDOWN_PAGES: u32 = 50;

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub agent: Agent,
    /// Role list screen to show next.
    pub redirect: String,
}

fn catalog_key(is_inbound: bool) -> CacheKey {
    CacheKey::new(
        resources::PREMADE_PROMPTS,
        &[("is_inbound", is_inbound.to_string())],
    )
}

fn clients_key() -> CacheKey {
    CacheKey::new(resources::CLIENTS, &[("is_for_dropdown", "true")])
}

/// Premade prompts for an agent type, falling back to the bundled table when
/// the server has none.
pub async fn load_catalog(ctx: &AppContext, is_inbound: bool) -> Result<Vec<PremadePrompt>> {
    let backend = ctx.backend.clone();
    ctx.cache
        .fetch(&catalog_key(is_inbound), move || async move {
            let server = backend
                .premade_prompts(is_inbound)
                .await
                .map_err(DeskError::from)?;
            catalog::with_fallback(server)
        })
        .await
}

/// Every client for the dropdown, page by page.
pub async fn load_clients(ctx: &AppContext) -> Result<Vec<ClientOption>> {
    let backend = ctx.backend.clone();
    ctx.cache
        .fetch(&clients_key(), move || async move {
            let mut clients: Vec<ClientOption> = Vec::new();
            for page in 1..=MAX_DROPDOWN_PAGES {
                let fetched = backend
                    .list_clients(page, DROPDOWN_PAGE_SIZE)
                    .await
                    .map_err(DeskError::from)?;
                let last = fetched.items.is_empty() || fetched.is_last();
                clients.extend(fetched.items);
                if last {
                    break;
                }
            }
            Ok::<_, DeskError>(clients)
        })
        .await
}

/// Id of the default LLM model, if the backend lists it.
pub async fn resolve_llm_model(ctx: &AppContext) -> Result<Option<i64>> {
    let backend = ctx.backend.clone();
    let models: Vec<LlmModel> = ctx
        .cache
        .fetch(&CacheKey::bare(resources::LLM_MODELS), move || async move {
            backend.llm_models().await.map_err(DeskError::from)
        })
        .await?;
    let id = resolve_default_llm(&models);
    if id.is_none() {
        tracing::warn!(count = models.len(), "default LLM model not listed by backend");
    }
    Ok(id)
}

/// Lookups available without a network call.
fn local_lookups(ctx: &AppContext, wizard: &WizardController, is_inbound: bool) -> Result<Lookups> {
    let catalog = match ctx.cache.get(&catalog_key(is_inbound))? {
        Some(cached) => cached,
        None => catalog::fallback_prompts()?,
    };
    Ok(Lookups {
        catalog,
        prompts_title: wizard.prompts_title().map(str::to_string),
        clients: ctx.cache.get(&clients_key())?.unwrap_or_default(),
        llm_model_id: None,
    })
}

/// Validate the draft and save the agent.
///
/// Validation runs before any request. On success the draft is reset and
/// cached agent lists are invalidated; on failure the draft is left as it
/// was so the user can retry from the prompt step.
pub async fn submit(ctx: &AppContext, wizard: &WizardController) -> Result<SubmitOutcome> {
    if wizard.current() != Step::Prompt {
        return Err(DeskError::NotOnPromptStep(wizard.current().to_string()));
    }

    let draft = ctx.draft.snapshot();
    let lookups = local_lookups(ctx, wizard, draft.is_inbound)?;
    let mut payload = assemble(&draft, &lookups, wizard.role())?;
    payload.llm_model = resolve_llm_model(ctx).await?;

    let mode = wizard.mode();
    let result = match mode.agent_id() {
        None => ctx.backend.create_agent(&payload).await,
        Some(id) => ctx.backend.update_agent(id, &payload).await,
    };
    let agent = match result {
        Ok(agent) => agent,
        Err(e) => {
            tracing::warn!(
                error = %e,
                error_type = e.error_type(),
                retryable = e.is_retryable(),
                ?mode,
                "agent submission failed, draft kept"
            );
            return Err(e.into());
        }
    };

    ctx.draft.reset()?;
    ctx.cache.invalidate_resource(resources::AGENTS);
    tracing::info!(agent_id = agent.id, ?mode, "agent saved");

    Ok(SubmitOutcome {
        agent,
        redirect: wizard.finish_route(),
    })
}
