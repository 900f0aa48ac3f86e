//! CLI command handlers.

use std::future::Future;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::render;
use super::{
    ActivateArgs, AddArgs, AuthCommands, BotCommands, Cli, Commands, EditArgs, ModeArg,
    OpenAiArgs, ProfileCommands, ResourceCommands, ZoomCommands,
};
use crate::activation::{ActivationFlow, ActivationPhase};
use crate::bot::BotControl;
use crate::config::ClientConfig;
use crate::profile::{OpenAiKeyInput, OpenAiMode, ProfileService};
use crate::error::{ClientError, Result};
use crate::gateway::{ActivationCredentials, HttpGateway, NewResource};
use crate::resources::ResourceStore;
use crate::session::{AuthService, FileSessionStore};
use crate::util::timeout::with_timeout;
use crate::zoom::ZoomService;

/// Stdin is read line by line without disabling the terminal echo.
const PASSWORD_PROMPT: &str = "Password (shown as typed): ";
const KEY_PROMPT: &str = "OpenAI key (shown as typed): ";

/// Shared state for one CLI invocation.
pub struct Context {
    config: ClientConfig,
    gateway: Arc<HttpGateway>,
}

impl Context {
    /// Resolve configuration and open the gateway with the persisted session.
    pub fn open(base_url: Option<String>) -> Result<Self> {
        let mut config = ClientConfig::load()?;
        if let Some(url) = base_url {
            config = config.with_base_url(url);
        }
        let store = FileSessionStore::new(config.state_dir.clone(), &config.base_url);
        let gateway = HttpGateway::new(&config)?.with_session_store(Arc::new(store))?;
        Ok(Self {
            config,
            gateway: Arc::new(gateway),
        })
    }

    async fn bounded<T>(&self, future: impl Future<Output = Result<T>>) -> Result<T> {
        with_timeout(self.config.timeout, future).await
    }
}

/// Run a parsed command line; the error is the text to show the user.
pub async fn run(cli: Cli) -> std::result::Result<(), String> {
    let ctx = Context::open(cli.base_url).map_err(|e| e.user_message("Configuration error"))?;

    match cli.command {
        Commands::Auth(args) => match args.command {
            AuthCommands::Login(login) => handle_login(&ctx, &login.username, login.password)
                .await
                .map_err(|e| e.user_message("Login failed")),
            AuthCommands::Register(reg) => {
                handle_register(&ctx, &reg.username, reg.email.as_deref(), reg.password)
                    .await
                    .map_err(|e| e.user_message("Registration failed"))
            }
            AuthCommands::Logout => handle_logout(&ctx)
                .await
                .map_err(|e| e.user_message("Logout failed")),
            AuthCommands::Whoami => handle_whoami(&ctx)
                .await
                .map_err(|e| e.user_message("Could not load the profile")),
        },
        Commands::Resources(args) => {
            let store = ResourceStore::new(Arc::clone(&ctx.gateway));
            match args.command {
                ResourceCommands::List => handle_list(&ctx, &store)
                    .await
                    .map_err(|e| e.user_message("Failed to load resources")),
                ResourceCommands::Show(id) => handle_show(&ctx, &store, &id.id)
                    .await
                    .map_err(|e| e.user_message("Failed to load the resource")),
                ResourceCommands::Toggle(id) => handle_toggle(&ctx, &store, &id.id)
                    .await
                    .map_err(|e| e.user_message("Toggle failed")),
                ResourceCommands::Add(add) => handle_add(&ctx, &store, add)
                    .await
                    .map_err(|e| e.user_message("Could not add the resource")),
                ResourceCommands::Remove(id) => handle_remove(&ctx, &store, &id.id)
                    .await
                    .map_err(|e| e.user_message("Delete failed")),
                ResourceCommands::Edit(edit) => handle_edit(&ctx, &store, edit)
                    .await
                    .map_err(|e| e.user_message("Save failed")),
            }
        }
        Commands::Providers => handle_providers(&ctx)
            .await
            .map_err(|e| e.user_message("Could not load providers")),
        Commands::Activate(args) => handle_activate(&ctx, args)
            .await
            .map_err(|e| e.user_message("Activation failed")),
        Commands::Bot(args) => handle_bot(&ctx, args.command)
            .await
            .map_err(|e| e.user_message("Bot request failed")),
        Commands::Profile(args) => handle_profile(&ctx, args.command)
            .await
            .map_err(|e| e.user_message("Profile request failed")),
        Commands::Zoom(args) => handle_zoom(&ctx, args.command)
            .await
            .map_err(|e| e.user_message("Zoom request failed")),
    }
}

async fn handle_login(ctx: &Context, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_line(&mut stdin_lines(), PASSWORD_PROMPT)
            .await?
            .unwrap_or_default(),
    };
    let auth = AuthService::new(Arc::clone(&ctx.gateway));
    ctx.bounded(auth.login(username, &password)).await?;
    println!("✅ Logged in as {}", username.trim());
    Ok(())
}

async fn handle_register(
    ctx: &Context,
    username: &str,
    email: Option<&str>,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_line(&mut stdin_lines(), PASSWORD_PROMPT)
            .await?
            .unwrap_or_default(),
    };
    let auth = AuthService::new(Arc::clone(&ctx.gateway));
    ctx.bounded(auth.register(username, email, &password)).await?;
    println!("✅ Registered {}", username.trim());
    Ok(())
}

async fn handle_logout(ctx: &Context) -> Result<()> {
    let auth = AuthService::new(Arc::clone(&ctx.gateway));
    ctx.bounded(auth.logout()).await?;
    println!("Logged out");
    Ok(())
}

async fn handle_whoami(ctx: &Context) -> Result<()> {
    let auth = AuthService::new(Arc::clone(&ctx.gateway));
    let user = ctx.bounded(auth.me()).await?;
    match (&user.email, &user.role) {
        (Some(email), Some(role)) => println!("{} <{email}> ({role})", user.username),
        (Some(email), None) => println!("{} <{email}>", user.username),
        (None, Some(role)) => println!("{} ({role})", user.username),
        (None, None) => println!("{}", user.username),
    }
    Ok(())
}

async fn handle_providers(ctx: &Context) -> Result<()> {
    let auth = AuthService::new(Arc::clone(&ctx.gateway));
    let providers = ctx.bounded(auth.providers()).await?;
    if providers.is_empty() {
        println!("No providers available");
    }
    for provider in providers {
        match provider.name {
            Some(name) => println!("{:<16} {name}", provider.key),
            None => println!("{}", provider.key),
        }
    }
    Ok(())
}

async fn handle_list(ctx: &Context, store: &ResourceStore<HttpGateway>) -> Result<()> {
    let resources = ctx.bounded(store.list()).await?;
    println!("{}", render::resource_table(&resources));
    Ok(())
}

async fn handle_show(ctx: &Context, store: &ResourceStore<HttpGateway>, id: &str) -> Result<()> {
    let resource = ctx.bounded(store.get(id)).await?;
    println!("{}", render::resource_detail(&resource));
    Ok(())
}

async fn handle_toggle(ctx: &Context, store: &ResourceStore<HttpGateway>, id: &str) -> Result<()> {
    ctx.bounded(store.list()).await?;
    let resource = ctx.bounded(store.toggle(id)).await?;
    println!("{} is now {}", resource.id, resource.status);
    Ok(())
}

async fn handle_add(ctx: &Context, store: &ResourceStore<HttpGateway>, args: AddArgs) -> Result<()> {
    let metadata = args.meta.as_deref().map(parse_meta).transpose()?;
    let new = NewResource::builder()
        .provider(args.provider)
        .maybe_label(args.label)
        .maybe_metadata(metadata)
        .build();
    let resource = ctx.bounded(store.add(new)).await?;
    println!("✅ Added {} ({}, {})", resource.id, resource.provider, resource.status);
    Ok(())
}

async fn handle_remove(ctx: &Context, store: &ResourceStore<HttpGateway>, id: &str) -> Result<()> {
    ctx.bounded(store.remove(id)).await?;
    println!("Removed {}", id.trim());
    Ok(())
}

async fn handle_edit(ctx: &Context, store: &ResourceStore<HttpGateway>, args: EditArgs) -> Result<()> {
    let metadata = args.meta.as_deref().map(parse_meta).transpose()?.unwrap_or_default();
    let resource = ctx.bounded(store.update(&args.id, &args.label, metadata)).await?;
    println!("✅ Saved {}", resource.id);
    println!("{}", render::resource_detail(&resource));
    Ok(())
}

async fn handle_bot(ctx: &Context, command: BotCommands) -> Result<()> {
    let bot = BotControl::new(Arc::clone(&ctx.gateway));
    match command {
        BotCommands::Status => println!("{}", render::bot_line(&ctx.bounded(bot.status()).await?)),
        BotCommands::Toggle => println!("{}", render::bot_line(&ctx.bounded(bot.toggle()).await?)),
        BotCommands::Preflight => {
            let active = ctx.bounded(bot.preflight()).await?;
            println!("Workers: {}", if active { "running" } else { "stopped" });
        }
        BotCommands::Start => println!("{}", render::run_outcome(ctx.bounded(bot.start()).await?)),
        BotCommands::Stop => println!("{}", render::run_outcome(ctx.bounded(bot.stop()).await?)),
        BotCommands::State => println!("{}", render::bot_overview(&ctx.bounded(bot.overview()).await?)),
    }
    Ok(())
}

async fn handle_profile(ctx: &Context, command: ProfileCommands) -> Result<()> {
    let profile = ProfileService::new(Arc::clone(&ctx.gateway));
    match command {
        ProfileCommands::Openai => {
            let settings = ctx.bounded(profile.openai_settings()).await?;
            println!("mode:    {}", settings.mode);
            println!("key:     {}", settings.key_masked.as_deref().unwrap_or("—"));
            println!("model:   {}", settings.model.as_deref().unwrap_or("—"));
            if let Some(limit) = settings.history_limit {
                println!("history: {limit}");
            }
            println!("voice:   {}", if settings.voice_enabled { "on" } else { "off" });
        }
        ProfileCommands::OpenaiTest(args) => {
            let input = key_input(args).await?;
            let message = ctx.bounded(profile.test_openai_key(input)).await?;
            println!("✅ {}", message.as_deref().unwrap_or("Key accepted"));
        }
        ProfileCommands::OpenaiSave(args) => {
            let input = key_input(args).await?;
            ctx.bounded(profile.save_openai_settings(input)).await?;
            println!("✅ OpenAI settings saved");
        }
    }
    Ok(())
}

async fn key_input(args: OpenAiArgs) -> Result<OpenAiKeyInput> {
    let mode = match args.mode {
        ModeArg::Byok => OpenAiMode::Byok,
        ModeArg::Managed => OpenAiMode::Managed,
    };
    let key = match (mode, args.key) {
        (OpenAiMode::Byok, None) => prompt_line(&mut stdin_lines(), KEY_PROMPT).await?,
        (_, key) => key,
    };
    Ok(OpenAiKeyInput::builder()
        .mode(mode)
        .maybe_key(key)
        .voice_enabled(args.voice)
        .build())
}

async fn handle_zoom(ctx: &Context, command: ZoomCommands) -> Result<()> {
    let zoom = ZoomService::new(Arc::clone(&ctx.gateway));
    match command {
        ZoomCommands::Items(id) => {
            let items = ctx.bounded(zoom.items(&id.id)).await?;
            println!("{}", render::zoom_items(&items));
        }
        ZoomCommands::Reports(id) => {
            let reports = ctx.bounded(zoom.reports(&id.id)).await?;
            if reports.is_empty() {
                println!("No reports yet");
            }
            for report in reports {
                println!("{}  {}", report.filename, report.summary);
            }
        }
        ZoomCommands::Upload(args) => {
            let name = ctx.bounded(zoom.upload(&args.id, &args.file)).await?;
            println!("✅ Uploaded {name}");
        }
        ZoomCommands::Process(args) => {
            let done = ctx.bounded(zoom.process(&args.id, &args.filename)).await?;
            println!("✅ Transcribed {} ({} characters)", args.filename.trim(), done.length);
        }
        ZoomCommands::Report(args) => {
            let report = ctx.bounded(zoom.report(&args.id, &args.filename, &args.prompt)).await?;
            println!("✅ Report {} ({} characters)", report.filename, report.length);
        }
        ZoomCommands::Open(args) => {
            println!("{}", ctx.bounded(zoom.open_report(&args.id, &args.filename)).await?);
        }
    }
    Ok(())
}

/// Drive the activation handshake, reading the confirmation code from stdin.
///
/// A wrong code prompts again; an empty line or end of input cancels.
async fn handle_activate(ctx: &Context, args: ActivateArgs) -> Result<()> {
    let store = Arc::new(ResourceStore::new(Arc::clone(&ctx.gateway)));
    let mut flow = ActivationFlow::new(store);
    let credentials = ActivationCredentials::builder()
        .phone(args.phone)
        .app_id(args.app_id)
        .app_hash(args.app_hash)
        .build();

    if ctx.bounded(flow.begin(&args.id, credentials)).await? == ActivationPhase::Done {
        println!("✅ {} activated", args.id);
        return Ok(());
    }

    println!("📋 Telegram sent a confirmation code.");
    let mut lines = stdin_lines();
    loop {
        let code = prompt_line(&mut lines, "Code (empty to cancel): ").await?;
        let Some(code) = code.filter(|c| !c.trim().is_empty()) else {
            flow.cancel();
            println!("Activation cancelled");
            return Ok(());
        };
        match ctx.bounded(flow.confirm(&code)).await {
            Ok(_) => {
                println!("✅ {} activated", args.id);
                return Ok(());
            }
            Err(err)
                if matches!(
                    flow.phase(),
                    ActivationPhase::CodeRequested | ActivationPhase::Confirming
                ) =>
            {
                eprintln!("❌ {}", err.user_message("Confirmation failed"));
            }
            Err(err) => return Err(err),
        }
    }
}

fn parse_meta(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ClientError::Validation(
            "--meta must be a JSON object".to_string(),
        )),
        Err(e) => Err(ClientError::Validation(format!("--meta is not valid JSON: {e}"))),
    }
}

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

async fn prompt_line(lines: &mut Lines<BufReader<Stdin>>, prompt: &str) -> Result<Option<String>> {
    use std::io::Write;
    print!("{prompt}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_must_be_an_object() {
        assert!(parse_meta(r#"{"creds":{"phone":"+1"}}"#).is_ok());
        assert!(matches!(parse_meta("[1,2]"), Err(ClientError::Validation(_))));
        assert!(matches!(parse_meta("{oops"), Err(ClientError::Validation(_))));
    }
}
