use std::path::PathBuf;
use std::sync::Arc;

use campus::api::types::{RegisterRequest, Role};
use campus::api::{ApiClient, ApiError};
use campus::chat::transport::TransportError;
use campus::chat::{ChatEndpoint, ChatSession, ChatUpdate, ConnectionStatus, EchoPolicy, WsConnector};
use campus::config::{ClientConfig, ConfigError, normalize_base_url};
use campus::session::{SessionContext, SessionError};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("not logged in; run `campus login` first")]
    NotLoggedIn,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("stdin read failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "campus", about = "Campus e-learning client")]
struct Cli {
    /// REST API root, e.g. `https://campus.example.edu/api/`.
    #[arg(long)]
    base_url: Option<String>,

    /// Where login tokens are kept between runs.
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// Name shown on your own chat messages before the server confirms them.
    #[arg(long)]
    display_name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

struct CliContext {
    config: ClientConfig,
    api: ApiClient,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register(RegisterArgs),
    Login {
        /// Username or email.
        username: String,
        #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show the logged-in user, refreshing the token if needed.
    Me,
    Users(UsersCommand),
    Courses(CoursesCommand),
    Materials(MaterialsCommand),
    Feedback(FeedbackCommand),
    Status(StatusCommand),
    Notifications(NotificationsCommand),
    Chat(ChatCommand),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Student,
    Teacher,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Student => Role::Student,
            RoleArg::Teacher => Role::Teacher,
        }
    }
}

#[derive(Args, Debug)]
struct RegisterArgs {
    username: String,
    email: String,
    #[arg(long, value_enum, default_value = "student")]
    role: RoleArg,
    #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    Show { user_id: i64 },
    /// Teacher-only search by username or email.
    Search { query: String },
}

#[derive(Args, Debug)]
struct CoursesCommand {
    #[command(subcommand)]
    command: CoursesSubcommand,
}

#[derive(Subcommand, Debug)]
enum CoursesSubcommand {
    List,
    Show {
        course_id: i64,
    },
    Enroll {
        course_id: i64,
    },
    Create {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Courses taught by the logged-in teacher.
    Mine,
    Enrollments,
}

#[derive(Args, Debug)]
struct MaterialsCommand {
    #[command(subcommand)]
    command: MaterialsSubcommand,
}

#[derive(Subcommand, Debug)]
enum MaterialsSubcommand {
    List {
        course_id: i64,
    },
    Upload {
        course_id: i64,
        path: PathBuf,
        #[arg(long, default_value = "")]
        title: String,
    },
}

#[derive(Args, Debug)]
struct FeedbackCommand {
    #[command(subcommand)]
    command: FeedbackSubcommand,
}

#[derive(Subcommand, Debug)]
enum FeedbackSubcommand {
    Leave {
        course_id: i64,
        #[arg(long, value_parser = clap::value_parser!(i32).range(1..=5))]
        rating: i32,
        #[arg(long)]
        comment: Option<String>,
    },
}

#[derive(Args, Debug)]
struct StatusCommand {
    #[command(subcommand)]
    command: StatusSubcommand,
}

#[derive(Subcommand, Debug)]
enum StatusSubcommand {
    List {
        #[arg(long)]
        student: Option<i64>,
    },
    Post {
        content: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct NotificationsCommand {
    #[command(subcommand)]
    command: NotificationsSubcommand,
}

#[derive(Subcommand, Debug)]
enum NotificationsSubcommand {
    List,
    Read { id: i64 },
}

#[derive(Args, Debug)]
struct ChatCommand {
    #[command(subcommand)]
    command: ChatSubcommand,
}

#[derive(Subcommand, Debug)]
enum ChatSubcommand {
    Rooms,
    History {
        room_id: i64,
    },
    /// Join a room: stdin lines are sent, messages are printed.
    Join(ChatJoinArgs),
}

#[derive(Args, Debug)]
struct ChatJoinArgs {
    #[arg(default_value = "dashboard_chat")]
    room: String,

    /// Confirm your own echoed messages in place instead of printing them twice.
    #[arg(long, default_value_t = false)]
    reconcile_echo: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let ctx = build_context(&cli)?;

    match cli.command {
        Command::Register(args) => run_register(&ctx, args).await,
        Command::Login { username, password } => run_login(&ctx, &username, &password).await,
        Command::Logout => {
            ctx.api.logout()?;
            eprintln!("logged out");
            Ok(())
        }
        Command::Me => run_me(&ctx).await,
        Command::Users(users) => run_users(&ctx, users).await,
        Command::Courses(courses) => run_courses(&ctx, courses).await,
        Command::Materials(materials) => run_materials(&ctx, materials).await,
        Command::Feedback(feedback) => run_feedback(&ctx, feedback).await,
        Command::Status(status) => run_status(&ctx, status).await,
        Command::Notifications(notifications) => run_notifications(&ctx, notifications).await,
        Command::Chat(chat) => run_chat(&ctx, chat).await,
    }
}

fn build_context(cli: &Cli) -> Result<CliContext, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = normalize_base_url(base_url)?;
    }
    if let Some(display_name) = &cli.display_name {
        config.display_name.clone_from(display_name);
    }
    if let Some(path) = &cli.session_file {
        config.session_file = Some(path.clone());
    }
    if config.session_file.is_none() {
        config.session_file = default_session_file();
    }

    let session = match &config.session_file {
        Some(path) => SessionContext::load(path)?,
        None => SessionContext::new(),
    };
    let api = ApiClient::new(&config, session)?;
    tracing::debug!(
        base_url = api.base_url(),
        session_file = ?api.session().path(),
        "client configured"
    );
    Ok(CliContext { config, api })
}

fn default_session_file() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("campus").join("session.json"))
}

fn require_login(ctx: &CliContext) -> Result<String, CliError> {
    ctx.api.session().current_access_token().ok_or(CliError::NotLoggedIn)
}

async fn run_register(ctx: &CliContext, args: RegisterArgs) -> Result<(), CliError> {
    let request = RegisterRequest {
        username: args.username,
        email: args.email,
        role: args.role.into(),
        password: args.password.clone(),
        password2: args.password,
    };
    let created = ctx.api.register(&request).await?;
    print_json(&created)
}

async fn run_login(ctx: &CliContext, username: &str, password: &str) -> Result<(), CliError> {
    match ctx.api.login(username, password).await? {
        Some(user) => print_json(&user),
        None => {
            eprintln!("logged in");
            Ok(())
        }
    }
}

async fn run_me(ctx: &CliContext) -> Result<(), CliError> {
    require_login(ctx)?;
    match ctx.api.restore_user().await? {
        Some(user) => print_json(&user),
        None => Err(CliError::NotLoggedIn),
    }
}

async fn run_users(ctx: &CliContext, users: UsersCommand) -> Result<(), CliError> {
    match users.command {
        UsersSubcommand::Show { user_id } => print_json(&ctx.api.user_profile(user_id).await?),
        UsersSubcommand::Search { query } => {
            require_login(ctx)?;
            print_json(&ctx.api.search_users(&query).await?)
        }
    }
}

async fn run_courses(ctx: &CliContext, courses: CoursesCommand) -> Result<(), CliError> {
    match courses.command {
        CoursesSubcommand::List => print_json(&ctx.api.courses().await?),
        CoursesSubcommand::Show { course_id } => print_json(&ctx.api.course_detail(course_id).await?),
        CoursesSubcommand::Enroll { course_id } => {
            require_login(ctx)?;
            print_json(&ctx.api.enroll(course_id).await?)
        }
        CoursesSubcommand::Create { title, description } => {
            require_login(ctx)?;
            print_json(&ctx.api.create_course(&title, &description).await?)
        }
        CoursesSubcommand::Mine => {
            require_login(ctx)?;
            let username = match ctx.api.session().user() {
                Some(user) => user.username,
                None => ctx.api.current_user().await?.username,
            };
            print_json(&ctx.api.teacher_courses(&username).await?)
        }
        CoursesSubcommand::Enrollments => {
            require_login(ctx)?;
            print_json(&ctx.api.enrollments().await?)
        }
    }
}

async fn run_materials(ctx: &CliContext, materials: MaterialsCommand) -> Result<(), CliError> {
    match materials.command {
        MaterialsSubcommand::List { course_id } => print_json(&ctx.api.materials(course_id).await?),
        MaterialsSubcommand::Upload { course_id, path, title } => {
            require_login(ctx)?;
            print_json(&ctx.api.upload_material(course_id, &title, &path).await?)
        }
    }
}

async fn run_feedback(ctx: &CliContext, feedback: FeedbackCommand) -> Result<(), CliError> {
    require_login(ctx)?;
    match feedback.command {
        FeedbackSubcommand::Leave { course_id, rating, comment } => {
            print_json(&ctx.api.leave_feedback(course_id, rating, comment.as_deref()).await?)
        }
    }
}

async fn run_status(ctx: &CliContext, status: StatusCommand) -> Result<(), CliError> {
    require_login(ctx)?;
    match status.command {
        StatusSubcommand::List { student } => print_json(&ctx.api.status_updates(student).await?),
        StatusSubcommand::Post { content } => print_json(&ctx.api.post_status_update(&content).await?),
        StatusSubcommand::Delete { id } => {
            ctx.api.delete_status_update(id).await?;
            eprintln!("deleted status update {id}");
            Ok(())
        }
    }
}

async fn run_notifications(ctx: &CliContext, notifications: NotificationsCommand) -> Result<(), CliError> {
    require_login(ctx)?;
    match notifications.command {
        NotificationsSubcommand::List => print_json(&ctx.api.notifications().await?),
        NotificationsSubcommand::Read { id } => print_json(&ctx.api.mark_notification_read(id).await?),
    }
}

async fn run_chat(ctx: &CliContext, chat: ChatCommand) -> Result<(), CliError> {
    require_login(ctx)?;
    match chat.command {
        ChatSubcommand::Rooms => print_json(&ctx.api.chat_rooms().await?),
        ChatSubcommand::History { room_id } => print_json(&ctx.api.chat_messages(room_id).await?),
        ChatSubcommand::Join(args) => run_chat_join(ctx, args).await,
    }
}

enum ChatInput {
    Update(Option<ChatUpdate>),
    Line(Option<String>),
}

async fn run_chat_join(ctx: &CliContext, args: ChatJoinArgs) -> Result<(), CliError> {
    let token = require_login(ctx)?;
    let endpoint = ChatEndpoint::from_config(&ctx.config)?;
    let display_name = ctx
        .api
        .session()
        .user()
        .map_or_else(|| ctx.config.display_name.clone(), |u| u.username);
    let echo = if args.reconcile_echo { EchoPolicy::Reconcile } else { EchoPolicy::Keep };

    let mut chat = ChatSession::new(endpoint, Arc::new(WsConnector), display_name)
        .with_echo_policy(echo)
        .with_reconnect(ctx.config.reconnect);
    chat.open(&token, &args.room);
    eprintln!("joining {} as {}", args.room, chat.display_name());
    print_badge(chat.status());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let input = tokio::select! {
            update = chat.recv() => ChatInput::Update(update),
            line = lines.next_line() => ChatInput::Line(line?),
        };

        match input {
            ChatInput::Update(Some(update)) => render_update(&update),
            ChatInput::Update(None) => {
                eprintln!("chat disconnected; run the command again to reconnect");
                break;
            }
            ChatInput::Line(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                if !chat.can_send() {
                    eprintln!("[{}] message not sent", chat.status());
                    continue;
                }
                chat.send(&line);
            }
            ChatInput::Line(None) => {
                chat.close();
                break;
            }
        }
    }
    Ok(())
}

fn render_update(update: &ChatUpdate) {
    match update {
        ChatUpdate::Status(status) => print_badge(*status),
        ChatUpdate::Message(message) => println!("{}: {}", message.user, message.message),
        ChatUpdate::Reconnecting { attempt, delay } => {
            eprintln!("reconnecting (attempt {}) after {}ms", attempt + 1, delay.as_millis());
        }
        ChatUpdate::Confirmed(_) | ChatUpdate::Discarded => {}
    }
}

fn print_badge(status: ConnectionStatus) {
    eprintln!("[{status}]");
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
