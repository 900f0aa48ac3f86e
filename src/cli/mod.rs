//! CLI entry point for dashclient.

pub mod commands;
pub mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Dashboard backend CLI
#[derive(Parser, Debug)]
#[command(name = "dashclient", version, about = "dashclient — dashboard backend CLI")]
pub struct Cli {
    /// Backend base URL (overrides config and DASHCLIENT_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Session management
    Auth(AuthArgs),
    /// Resource list and lifecycle
    Resources(ResourcesArgs),
    /// List the resource types that can be added
    Providers,
    /// Activate a Telegram resource (phone code confirmation)
    Activate(ActivateArgs),
    /// Global bot switch and workers
    Bot(BotArgs),
    /// OpenAI access settings of the profile
    Profile(ProfileArgs),
    /// Zoom recordings, transcripts and reports
    Zoom(ZoomArgs),
}

#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Login with username and password
    Login(LoginArgs),
    /// Create an account and log in
    Register(RegisterArgs),
    /// End the session
    Logout,
    /// Show the logged-in user
    Whoami,
}

#[derive(Parser, Debug)]
pub struct LoginArgs {
    pub username: String,
    /// Password; read from stdin when omitted. Typed input is echoed, so pipe it in
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RegisterArgs {
    pub username: String,
    #[arg(long)]
    pub email: Option<String>,
    /// Password; read from stdin when omitted. Typed input is echoed, so pipe it in
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ResourcesArgs {
    #[command(subcommand)]
    pub command: ResourceCommands,
}

#[derive(Subcommand, Debug)]
pub enum ResourceCommands {
    /// List resources
    List,
    /// Show one resource with redacted settings
    Show(IdArgs),
    /// Activate a paused resource or pause an active one
    Toggle(IdArgs),
    /// Create a resource
    Add(AddArgs),
    /// Delete a resource
    Remove(IdArgs),
    /// Change a resource's label and settings
    Edit(EditArgs),
}

#[derive(Parser, Debug)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Provider key (see `dashclient providers`)
    pub provider: String,
    #[arg(long)]
    pub label: Option<String>,
    /// Initial settings as a JSON object
    #[arg(long)]
    pub meta: Option<String>,
}

#[derive(Parser, Debug)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub label: String,
    /// Settings to merge, as a JSON object
    #[arg(long)]
    pub meta: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ActivateArgs {
    /// Resource id
    pub id: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub app_id: String,
    #[arg(long)]
    pub app_hash: String,
}

#[derive(Parser, Debug)]
pub struct BotArgs {
    #[command(subcommand)]
    pub command: BotCommands,
}

#[derive(Subcommand, Debug)]
pub enum BotCommands {
    Status,
    Toggle,
    /// Whether workers are running
    Preflight,
    /// Start workers for active resources
    Start,
    /// Stop all workers
    Stop,
    /// Bot flag plus per-resource worker view
    State,
}

#[derive(Parser, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show the OpenAI settings (key masked)
    Openai,
    /// Check an OpenAI key with the backend
    OpenaiTest(OpenAiArgs),
    /// Save the OpenAI mode and key
    OpenaiSave(OpenAiArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Byok,
    Managed,
}

#[derive(Args, Debug)]
pub struct OpenAiArgs {
    #[arg(long, value_enum, default_value_t = ModeArg::Byok)]
    pub mode: ModeArg,
    /// API key; read from stdin in byok mode when omitted. Typed input is echoed, so pipe it in
    #[arg(long)]
    pub key: Option<String>,
    #[arg(long)]
    pub voice: bool,
}

#[derive(Parser, Debug)]
pub struct ZoomArgs {
    #[command(subcommand)]
    pub command: ZoomCommands,
}

#[derive(Subcommand, Debug)]
pub enum ZoomCommands {
    /// List recordings with transcript and report state
    Items(IdArgs),
    /// List finished reports
    Reports(IdArgs),
    /// Upload an .mp3 recording
    Upload(ZoomUploadArgs),
    /// Transcribe an uploaded recording
    Process(ZoomFileArgs),
    /// Generate a report from a transcript
    Report(ZoomReportArgs),
    /// Print a generated report
    Open(ZoomFileArgs),
}

#[derive(Parser, Debug)]
pub struct ZoomUploadArgs {
    pub id: String,
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ZoomFileArgs {
    pub id: String,
    pub filename: String,
}

#[derive(Parser, Debug)]
pub struct ZoomReportArgs {
    pub id: String,
    pub filename: String,
    /// Instructions for the summary
    #[arg(long, default_value = "")]
    pub prompt: String,
}
