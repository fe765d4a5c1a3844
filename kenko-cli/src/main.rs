use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sqlx::SqlitePool;

use kenko::analytics::{self, AnalyticsDataPoint, AnalyticsRequest, GroupBy, Metric};
use kenko::db::models::NewDashboardWidget;
use kenko::db::{self, operations, widgets};

mod seed;

#[derive(Parser, Debug)]
#[command(version, about = "Kenko - workout analytics CLI", long_about = None)]
struct Args {
    /// Sqlite database path (defaults to DATABASE_URL, then kenko.db)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one analytics query
    Query {
        /// Acting user id
        #[arg(long)]
        user: i64,

        /// volume, max_weight, total_reps, total_sets, or frequency
        #[arg(long)]
        metric: Metric,

        /// muscle_group, exercise, workout_template, or date
        #[arg(long)]
        group_by: Option<GroupBy>,

        /// Inclusive lower bound (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Inclusive upper bound (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Restrict to these exercise or muscle group ids
        #[arg(long = "filter-id")]
        filter_ids: Vec<i64>,

        /// Restrict to exercises looked up by name
        #[arg(long)]
        exercise: Vec<String>,

        /// Restrict to muscle groups looked up by name
        #[arg(long)]
        muscle: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// List a user's workout sessions with their set counts
    Sessions {
        #[arg(long)]
        user: i64,
    },

    /// List the exercise catalog with ids
    Exercises,

    /// List the muscle groups with ids
    Muscles,

    /// Manage dashboard widgets
    #[command(subcommand)]
    Widgets(WidgetCommands),

    /// Populate a demo user with generated workout history
    SeedDemo {
        #[arg(long, default_value = "demo")]
        username: String,

        /// Clear all tables first
        #[arg(long)]
        reset: bool,

        /// Weeks of history to generate
        #[arg(long, default_value_t = 8)]
        weeks: u32,
    },
}

#[derive(Subcommand, Debug)]
enum WidgetCommands {
    /// List a user's widgets
    List {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        json: bool,
    },

    /// Save a new widget
    Add {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        metric: Metric,
        #[arg(long)]
        group_by: GroupBy,
        /// 7d, 30d, 90d, 180d, 1y, or all
        #[arg(long, default_value = "30d")]
        time_range: String,
        #[arg(long, default_value = "area")]
        chart_type: String,
        /// none, exercise, or muscle_group
        #[arg(long, default_value = "none")]
        filter_type: String,
        #[arg(long)]
        filter_id: Option<String>,
        #[arg(long, default_value_t = 0)]
        position: i64,
    },

    /// Delete a widget
    Remove {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        id: i64,
    },

    /// Run a widget's saved request against today's data
    Render {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let db_path = args
        .database
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "kenko.db".to_string());
    let pool = db::connect(&db_path).await?;

    match args.command {
        Commands::Query {
            user,
            metric,
            group_by,
            start_date,
            end_date,
            filter_ids,
            exercise,
            muscle,
            json,
        } => {
            let filter_ids =
                resolve_filter_ids(&pool, filter_ids, &exercise, &muscle).await?;
            let request = AnalyticsRequest {
                metric,
                group_by,
                start_date,
                end_date,
                filter_ids,
            };
            let points = analytics::get_analytics_data(&pool, user, &request).await?;
            print_points(&points, json)?;
        }
        Commands::Sessions { user } => {
            let sessions = operations::get_sessions_for_user(&pool, user).await?;
            if sessions.is_empty() {
                println!("No sessions.");
            }
            for session in sessions {
                let sets = operations::get_sets_for_session(&pool, session.id).await?;
                println!(
                    "{}  {} ({} sets)",
                    session.date,
                    session.name.as_deref().unwrap_or("Unknown"),
                    sets.len()
                );
            }
        }
        Commands::Exercises => {
            for exercise in operations::get_all_exercises(&pool).await? {
                println!("{:>4}  {}", exercise.id, exercise.name);
            }
        }
        Commands::Muscles => {
            for muscle_group in operations::get_all_muscle_groups(&pool).await? {
                println!("{:>4}  {}", muscle_group.id, muscle_group.name);
            }
        }
        Commands::Widgets(command) => run_widgets(&pool, command).await?,
        Commands::SeedDemo {
            username,
            reset,
            weeks,
        } => seed::run(&pool, &username, reset, weeks).await?,
    }

    Ok(())
}

async fn resolve_filter_ids(
    pool: &SqlitePool,
    mut filter_ids: Vec<i64>,
    exercises: &[String],
    muscles: &[String],
) -> Result<Vec<i64>> {
    for name in exercises {
        let found = operations::find_exercise_by_name(pool, name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Unknown exercise: {}", name))?;
        filter_ids.push(found.id);
    }
    for name in muscles {
        let found = operations::find_muscle_group_by_name(pool, name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Unknown muscle group: {}", name))?;
        filter_ids.push(found.id);
    }
    Ok(filter_ids)
}

async fn run_widgets(pool: &SqlitePool, command: WidgetCommands) -> Result<()> {
    match command {
        WidgetCommands::List { user, json } => {
            let widgets = widgets::get_widgets_for_user(pool, user).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&widgets)?);
            } else if widgets.is_empty() {
                println!("No widgets.");
            } else {
                for widget in widgets {
                    println!("{}", widget);
                }
            }
        }
        WidgetCommands::Add {
            user,
            title,
            metric,
            group_by,
            time_range,
            chart_type,
            filter_type,
            filter_id,
            position,
        } => {
            let widget = widgets::create_widget(
                pool,
                user,
                &NewDashboardWidget {
                    title,
                    metric: metric.to_string(),
                    group_by: group_by.to_string(),
                    time_range,
                    chart_type,
                    filter_type,
                    filter_id,
                    position,
                },
            )
            .await?;
            println!("Created widget {}", widget);
        }
        WidgetCommands::Remove { user, id } => {
            if widgets::delete_widget(pool, user, id).await? {
                println!("Deleted widget #{}", id);
            } else {
                anyhow::bail!("Widget #{} not found", id);
            }
        }
        WidgetCommands::Render { user, id, json } => {
            let widget = widgets::get_widget(pool, user, id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Widget #{} not found", id))?;
            let request = widget.to_request(Local::now().date_naive())?;
            let points = analytics::get_analytics_data(pool, user, &request).await?;
            print_points(&points, json)?;
        }
    }
    Ok(())
}

fn print_points(points: &[AnalyticsDataPoint], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(points)?);
        return Ok(());
    }
    if points.is_empty() {
        println!("No data.");
        return Ok(());
    }
    let width = points
        .iter()
        .map(|point| point.label.len())
        .max()
        .unwrap_or(0);
    for point in points {
        println!("{:<width$}  {:>12.1}", point.label, point.value, width = width);
    }
    Ok(())
}
