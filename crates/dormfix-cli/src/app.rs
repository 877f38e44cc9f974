//! Subcommands and their execution against a [`Client`].

use std::io::Write;

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use dormfix_core::{
  client::Client,
  credential::SignupRequest,
  dorm::{DORM_BUILDINGS, assign_dorm_raw},
  issue::{Category, IssueId, NewIssue, Severity},
  query::{AdminQuery, SortMode},
  session::Session,
};

use crate::render;

// ─── Commands ─────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Register a student account.
  Signup {
    #[arg(long)]
    student_id:       String,
    /// Building to register under; see `dormfix dorms`.
    #[arg(long)]
    dorm:             Option<String>,
    #[arg(long, env = "DORMFIX_PASSWORD")]
    password:         String,
    #[arg(long)]
    confirm_password: String,
  },

  /// Start a session.
  Login {
    #[command(subcommand)]
    role: LoginAs,
  },

  /// End the current session.
  Logout,

  /// Show the current session.
  Whoami,

  /// List the dormitory buildings.
  Dorms,

  /// Show the building assigned to a student id.
  Dorm { student_id: String },

  /// File a new issue for your building.
  Report {
    #[arg(long)]
    category:    Category,
    #[arg(long, default_value_t = Severity::Medium)]
    severity:    Severity,
    #[arg(long)]
    description: String,
    #[arg(long)]
    photo_url:   Option<String>,
  },

  /// Issues filed in your building.
  Issues,

  /// Issues you filed, active and resolved.
  Mine,

  /// Status counts for your building.
  Summary,

  /// Administrator queue.
  Admin {
    #[command(subcommand)]
    action: AdminAction,
  },
}

#[derive(Subcommand, Debug)]
pub enum LoginAs {
  Student {
    student_id: String,
    #[arg(long, env = "DORMFIX_PASSWORD")]
    password:   String,
  },
  Admin {
    #[arg(long, default_value = "admin")]
    username: String,
    #[arg(long, env = "DORMFIX_PASSWORD")]
    password: String,
  },
}

#[derive(Subcommand, Debug)]
pub enum AdminAction {
  /// The issue queue with headline counts.
  List {
    #[arg(long)]
    building: Option<String>,
    #[arg(long, default_value_t = SortMode::Severity)]
    sort:     SortMode,
  },
  /// Details of one issue.
  Show { id: IssueId },
  /// Move an issue to its next status.
  Advance { id: IssueId },
}

// ─── Execution ────────────────────────────────────────────────────────────────

/// Run `command` against `client`, writing human-readable output to `out`.
pub fn run(command: Command, client: &mut Client, out: &mut impl Write) -> Result<()> {
  let now = Utc::now();
  match command {
    Command::Signup { student_id, dorm, password, confirm_password } => {
      let id = client.signup(&SignupRequest { student_id, dorm, password, confirm_password })?;
      writeln!(out, "Registered {id}. Log in with `dormfix login student {id}`.")?;
    }
    Command::Login { role: LoginAs::Student { student_id, password } } => {
      let user = client.login_student(&student_id, &password)?;
      writeln!(out, "Logged in as {} ({})", user.student_id, user.building)?;
    }
    Command::Login { role: LoginAs::Admin { username, password } } => {
      client.login_admin(&username, &password)?;
      writeln!(out, "Logged in as administrator")?;
    }
    Command::Logout => {
      client.logout();
      writeln!(out, "Logged out")?;
    }
    Command::Whoami => match client.session() {
      Session::None => writeln!(out, "Not logged in")?,
      Session::Student(user) => writeln!(out, "student {} ({})", user.student_id, user.building)?,
      Session::Admin => writeln!(out, "admin")?,
    },
    Command::Dorms => {
      for building in DORM_BUILDINGS {
        writeln!(out, "{building}")?;
      }
    }
    Command::Dorm { student_id } => {
      writeln!(out, "{}", assign_dorm_raw(&student_id)?)?;
    }
    Command::Report { category, severity, description, photo_url } => {
      let mut input = NewIssue::new(category, description, severity);
      if let Some(url) = photo_url {
        input = input.with_photo(url);
      }
      let issue = client.report(input)?;
      writeln!(out, "Filed {} for {}", issue.id, issue.building)?;
    }
    Command::Issues => {
      let issues = client.building_issues()?;
      if issues.is_empty() {
        writeln!(out, "No issues reported in your building")?;
      } else {
        write!(out, "{}", render::issue_list("Building issues", &issues, now))?;
      }
    }
    Command::Mine => {
      let view = client.my_issues()?;
      write!(out, "{}", render::owner_view(&view, now))?;
    }
    Command::Summary => {
      let summary = client.building_summary()?;
      let building = client.session().user().map(|u| u.building.as_str()).unwrap_or_default();
      write!(out, "{}", render::summary(building, &summary))?;
    }
    Command::Admin { action: AdminAction::List { building, sort } } => {
      let query = AdminQuery { building: building.filter(|b| !b.is_empty()), sort };
      let view = client.admin_view(&query)?;
      write!(out, "{}", render::admin_view(&view, sort.label(), now))?;
    }
    Command::Admin { action: AdminAction::Show { id } } => {
      client.session().require_admin()?;
      let issue = client.desk().get_issue(id)?;
      write!(out, "{}", render::issue_detail(issue, now))?;
    }
    Command::Admin { action: AdminAction::Advance { id } } => {
      let issue = client.advance(id)?;
      writeln!(out, "{} is now {}", issue.id, issue.status.label())?;
    }
  }
  Ok(())
}
