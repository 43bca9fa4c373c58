use clap::{Args, Parser, Subcommand, ValueEnum};
use feedback_client::net::types::{FeedbackCreate, FeedbackUpdate, LoginCredentials, RegisterData, Role, Sentiment};
use feedback_client::router::NavigationError;
use feedback_client::{ApiError, App, AppError, ClientConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] feedback_client::config::ConfigError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error("api call failed: {0}")]
    Api(#[from] ApiError),
    #[error("navigation failed: {0}")]
    Navigation(#[from] NavigationError),
    #[error("{0}")]
    AuthFailed(String),
    #[error("not logged in; run `feedback-cli login` first")]
    NotLoggedIn,
    #[error("nothing to update; pass at least one field")]
    EmptyUpdate,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "feedback-cli", about = "Performance feedback client")]
struct Cli {
    #[arg(long, env = "FEEDBACK_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "FEEDBACK_TOKEN_FILE")]
    token_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "FEEDBACK_PASSWORD")]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "FEEDBACK_PASSWORD")]
        password: String,
        #[arg(long, value_enum)]
        role: RoleArg,
        #[arg(long)]
        manager_id: Option<i64>,
    },
    Logout,
    Whoami,
    User {
        user_id: i64,
    },
    Team,
    Managers,
    Feedback(FeedbackCommand),
    Dashboard(DashboardCommand),
    /// Resolve a client route through the navigation guard.
    Navigate {
        path: String,
    },
}

#[derive(Args, Debug)]
struct FeedbackCommand {
    #[command(subcommand)]
    command: FeedbackSubcommand,
}

#[derive(Subcommand, Debug)]
enum FeedbackSubcommand {
    Mine,
    All,
    Employee {
        employee_id: i64,
    },
    Get {
        feedback_id: i64,
    },
    Create {
        #[arg(long)]
        employee_id: i64,
        #[arg(long)]
        strengths: String,
        #[arg(long)]
        areas_to_improve: String,
        #[arg(long, value_enum)]
        sentiment: SentimentArg,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, default_value_t = false)]
        anonymous: bool,
    },
    Update {
        feedback_id: i64,
        #[arg(long)]
        strengths: Option<String>,
        #[arg(long)]
        areas_to_improve: Option<String>,
        #[arg(long, value_enum)]
        sentiment: Option<SentimentArg>,
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,
    },
    Ack {
        feedback_id: i64,
    },
    Comment {
        feedback_id: i64,
        comment: String,
    },
}

#[derive(Args, Debug)]
struct DashboardCommand {
    #[command(subcommand)]
    command: DashboardSubcommand,
}

#[derive(Subcommand, Debug)]
enum DashboardSubcommand {
    Manager,
    Employee,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoleArg {
    Manager,
    Employee,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Manager => Role::Manager,
            RoleArg::Employee => Role::Employee,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SentimentArg {
    Positive,
    Neutral,
    Negative,
}

impl From<SentimentArg> for Sentiment {
    fn from(value: SentimentArg) -> Self {
        match value {
            SentimentArg::Positive => Sentiment::Positive,
            SentimentArg::Neutral => Sentiment::Neutral,
            SentimentArg::Negative => Sentiment::Negative,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_env_filter(log_filter()).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = ClientConfig::from_values(cli.base_url.as_deref(), cli.token_file.as_deref())?;
    let mut app = App::from_config(&config)?;

    let result = run(&mut app, cli.command).await;
    if let Some(location) = app.handle_events().await? {
        tracing::warn!(path = %location.path, "server rejected the stored session; log in again");
    }
    result
}

async fn run(app: &mut App, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let credentials = LoginCredentials { email, password };
            if !app.session().login(&credentials).await {
                return Err(auth_failure(app));
            }
            print_json(&app.session().user())
        }
        Command::Register { name, email, password, role, manager_id } => {
            let data = RegisterData { name, email, password, role: role.into(), manager_id };
            if !app.session().register(&data).await {
                return Err(auth_failure(app));
            }
            print_json(&app.session().user())
        }
        Command::Logout => {
            app.session().logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            if !app.session().fetch_current_user().await {
                return Err(CliError::NotLoggedIn);
            }
            print_json(&app.session().user())
        }
        Command::User { user_id } => print_json(&app.api().user(user_id).await?),
        Command::Team => print_json(&app.api().team_members().await?),
        Command::Managers => print_json(&app.api().managers().await?),
        Command::Feedback(feedback) => run_feedback(app, feedback).await,
        Command::Dashboard(dashboard) => match dashboard.command {
            DashboardSubcommand::Manager => print_json(&app.api().manager_dashboard().await?),
            DashboardSubcommand::Employee => print_json(&app.api().employee_dashboard().await?),
        },
        Command::Navigate { path } => {
            let location = app.navigate(&path).await?;
            print_json(&serde_json::json!({
                "route": format!("{:?}", location.name),
                "path": location.path,
                "params": location.params,
            }))
        }
    }
}

async fn run_feedback(app: &App, feedback: FeedbackCommand) -> Result<(), CliError> {
    let api = app.api();
    match feedback.command {
        FeedbackSubcommand::Mine => print_json(&api.my_feedback().await?),
        FeedbackSubcommand::All => print_json(&api.all_feedback().await?),
        FeedbackSubcommand::Employee { employee_id } => print_json(&api.employee_feedback(employee_id).await?),
        FeedbackSubcommand::Get { feedback_id } => print_json(&api.feedback(feedback_id).await?),
        FeedbackSubcommand::Create { employee_id, strengths, areas_to_improve, sentiment, tags, anonymous } => {
            let body = FeedbackCreate {
                employee_id,
                strengths,
                areas_to_improve,
                sentiment: sentiment.into(),
                tags: (!tags.is_empty()).then_some(tags),
                is_anonymous: Some(anonymous),
            };
            print_json(&api.create_feedback(&body).await?)
        }
        FeedbackSubcommand::Update { feedback_id, strengths, areas_to_improve, sentiment, tags } => {
            let update = FeedbackUpdate { strengths, areas_to_improve, sentiment: sentiment.map(Into::into), tags };
            if update.is_empty() {
                return Err(CliError::EmptyUpdate);
            }
            print_json(&api.update_feedback(feedback_id, &update).await?)
        }
        FeedbackSubcommand::Ack { feedback_id } => print_json(&api.acknowledge_feedback(feedback_id).await?),
        FeedbackSubcommand::Comment { feedback_id, comment } => {
            print_json(&api.add_employee_comment(feedback_id, &comment).await?)
        }
    }
}

/// `RUST_LOG` directives, defaulting to warnings only.
fn log_filter() -> EnvFilter {
    EnvFilter::builder().with_default_directive(LevelFilter::WARN.into()).from_env_lossy()
}

fn auth_failure(app: &App) -> CliError {
    CliError::AuthFailed(app.session().error().unwrap_or_else(|| "authentication failed".to_owned()))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(&serde_json::to_value(value)?)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_feedback_create() {
        let cli = Cli::try_parse_from([
            "feedback-cli",
            "feedback",
            "create",
            "--employee-id",
            "4",
            "--strengths",
            "Ships reliably",
            "--areas-to-improve",
            "Delegate more",
            "--sentiment",
            "positive",
            "--tag",
            "ownership",
        ])
        .unwrap();
        let Command::Feedback(FeedbackCommand { command: FeedbackSubcommand::Create { employee_id, tags, .. } }) =
            cli.command
        else {
            panic!("expected feedback create");
        };
        assert_eq!(employee_id, 4);
        assert_eq!(tags, vec!["ownership".to_owned()]);
    }

    #[test]
    fn log_filter_follows_rust_log() {
        // SAFETY: no other test in this binary touches the environment.
        unsafe { std::env::remove_var("RUST_LOG") };
        assert_eq!(log_filter().max_level_hint(), Some(LevelFilter::WARN));

        unsafe { std::env::set_var("RUST_LOG", "debug") };
        assert_eq!(log_filter().max_level_hint(), Some(LevelFilter::DEBUG));
        unsafe { std::env::remove_var("RUST_LOG") };
    }

    #[test]
    fn role_arg_maps_to_role() {
        assert_eq!(Role::from(RoleArg::Manager), Role::Manager);
        assert_eq!(Sentiment::from(SentimentArg::Negative), Sentiment::Negative);
    }
}
