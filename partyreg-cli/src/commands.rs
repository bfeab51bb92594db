//! Command-line surface and its handlers.

use std::io::BufRead;
use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use partyreg_lib::model::ContactPreference;
use partyreg_lib::model::IncidentSeverity;
use tablekit::FilterType;
use tablekit::SortDirection;
use tablekit::TableTemplate;

use crate::client_manager::ClientManager;
use crate::error::CliError;
use crate::forms::ContactFields;
use crate::forms::Form;
use crate::forms::IncidentForm;
use crate::forms::PartyForm;
use crate::portals::Portal;
use crate::portals::ResourceTable;
use crate::portals::Role;
use crate::portals::TableKind;
use crate::portals::TableResource;
use crate::portals::format_phone;
use crate::render::render_sidebar;
use crate::render::render_table;
use crate::settings::Settings;
use crate::settings::SettingsError;

#[derive(Debug, Parser)]
#[command(name = "partyreg")]
#[command(about = "Off-campus party registration")]
pub struct Cli {
    /// Portal to act as. Defaults to the role in settings.json.
    #[arg(long, global = true, value_enum)]
    pub role: Option<Role>,
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    #[arg(long, global = true)]
    pub page_size: Option<usize>,
    /// Settings file to use instead of the default location.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show one page of a table.
    List(ListArgs),
    /// Delete a row after confirmation.
    Delete {
        #[arg(value_enum)]
        table: TableKind,
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Register a party.
    Register(RegisterArgs),
    /// Log an incident at a location.
    Incident(IncidentArgs),
    /// Download parties in a date range as CSV.
    Export {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// Output path. Defaults to the server's file name.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Search addresses.
    Address {
        input: String,
        /// Resolve each suggestion to its full place details.
        #[arg(long)]
        details: bool,
    },
    /// Show the signed-in student.
    Whoami,
    /// Print the effective settings.
    Config {
        /// Write them to the settings file.
        #[arg(long)]
        save: bool,
    },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub table: TableKind,
    /// Global search over every field.
    #[arg(long)]
    pub search: Option<String>,
    /// Column filter, e.g. `date=2025-04-01..2025-04-30`, `time=21:30`,
    /// `role=police`. Repeatable.
    #[arg(long = "filter", value_name = "COLUMN=VALUE")]
    pub filters: Vec<String>,
    /// Sort column, optionally `:desc`.
    #[arg(long, value_name = "COLUMN[:desc]")]
    pub sort: Option<String>,
    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Only parties near this place id (parties table).
    #[arg(long, value_name = "PLACE_ID", requires_all = ["start", "end"])]
    pub near: Option<String>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub date: NaiveDate,
    /// `HH:MM`, 24h.
    #[arg(long)]
    pub time: String,
    /// Place id from `partyreg address`.
    #[arg(long)]
    pub place_id: String,
    /// Registering student (staff only).
    #[arg(long)]
    pub student_id: Option<i64>,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    /// `call` or `text`.
    #[arg(long)]
    pub contact_preference: String,
}

#[derive(Debug, Args)]
pub struct IncidentArgs {
    #[arg(long)]
    pub location: i64,
    #[arg(long)]
    pub date: NaiveDate,
    /// `HH:MM`, 24h.
    #[arg(long, default_value = "")]
    pub time: String,
    /// `complaint`, `warning` or `citation`.
    #[arg(long)]
    pub severity: String,
    #[arg(long)]
    pub description: String,
}

impl Cli {
    /// Layers flag overrides on top of `settings`.
    pub fn apply_to(&self, mut settings: Settings) -> Settings {
        if let Some(role) = self.role {
            settings.role = role;
        }
        if let Some(url) = &self.api_url {
            settings.api_url = url.clone();
        }
        if let Some(size) = self.page_size.filter(|s| *s > 0) {
            settings.page_size = size;
        }
        settings
    }
}

/// Runs `command` with the effective settings.
pub async fn execute(command: Command, settings: Settings, settings_path: Option<PathBuf>) -> Result<(), CliError> {
    if let Command::Config { save } = command {
        return config(&settings, settings_path, save);
    }

    let manager = ClientManager::connect(&settings).await?;
    let portal = Portal::new(settings.role, manager.client().clone(), settings.page_size);
    log::info!("{} portal", settings.role);

    match command {
        Command::List(args) => list(&portal, &args).await,
        Command::Delete { table, id, yes } => delete(&portal, table, id, yes).await,
        Command::Register(args) => register(&portal, args).await,
        Command::Incident(args) => incident(&portal, args).await,
        Command::Export { start, end, out } => export(&portal, start, end, out).await,
        Command::Address { input, details } => address(&portal, &input, details).await,
        Command::Whoami => whoami(&portal).await,
        Command::Config { .. } => Ok(()),
    }
}

async fn list(portal: &Portal, args: &ListArgs) -> Result<(), CliError> {
    let view = match args.table {
        TableKind::Parties => {
            let mut parties = portal.parties()?;
            match (&args.near, args.start, args.end) {
                (Some(place_id), Some(start), Some(end)) => {
                    parties.search_address(place_id.clone(), start, end).await?
                }
                _ => parties.load().await?,
            }
            configure(parties.inner_mut().table_mut(), args)?;
            parties.render()
        }
        TableKind::Students => load_and_render(portal.students()?, args).await?,
        TableKind::Locations => load_and_render(portal.locations()?, args).await?,
        TableKind::Accounts => load_and_render(portal.accounts()?, args).await?,
    };
    print!("{}", render_table(&view));
    Ok(())
}

async fn load_and_render<R: TableResource>(
    mut table: ResourceTable<R>,
    args: &ListArgs,
) -> Result<tablekit::TableView, CliError> {
    table.load().await?;
    configure(table.table_mut(), args)?;
    Ok(table.render())
}

/// Applies search, filters, sort and page from the arguments.
pub fn configure<T: Clone>(table: &mut TableTemplate<T>, args: &ListArgs) -> Result<(), CliError> {
    if let Some(query) = &args.search {
        table.set_global_filter(query.clone());
    }
    for raw in &args.filters {
        apply_filter_arg(table, raw)?;
    }
    if let Some(sort) = &args.sort {
        let (column, direction) = match sort.split_once(':') {
            Some((column, "desc")) => (column, SortDirection::Desc),
            Some((column, "asc")) => (column, SortDirection::Asc),
            Some(_) => return Err(CliError::Usage(format!("bad sort {sort:?}, use COLUMN[:asc|:desc]"))),
            None => (sort.as_str(), SortDirection::Asc),
        };
        table.sort_by(column, direction);
    }
    table.go_to_page(args.page.saturating_sub(1));
    Ok(())
}

/// Applies one `COLUMN=VALUE` filter through the column's filter editor.
///
/// Date ranges are written `FROM..TO` or `FROM..`.
pub fn apply_filter_arg<T: Clone>(table: &mut TableTemplate<T>, raw: &str) -> Result<(), CliError> {
    let Some((column, value)) = raw.split_once('=') else {
        return Err(CliError::Usage(format!("bad filter {raw:?}, use COLUMN=VALUE")));
    };
    if !table.open_filter(column) {
        return Err(CliError::Usage(format!("column {column:?} cannot be filtered")));
    }
    let Some(editor) = table.filter_editor_mut() else {
        return Ok(());
    };

    let parse_day = |s: &str| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| CliError::Usage(format!("bad date {s:?}, use YYYY-MM-DD")))
    };

    match editor.filter_type() {
        FilterType::Text => {
            table.edit_filter_text(value);
            table.close_filter_editor();
            return Ok(());
        }
        FilterType::Date => editor.pick_date(parse_day(value)?),
        FilterType::DateRange => match value.split_once("..") {
            Some((from, to)) => {
                editor.pick_date(parse_day(from)?);
                if !to.trim().is_empty() {
                    editor.pick_date(parse_day(to)?);
                }
            }
            None => editor.pick_date(parse_day(value)?),
        },
        FilterType::Time => editor.set_time(value),
        FilterType::Select => editor.choose(value),
    }

    if editor.value().is_none() {
        table.close_filter_editor();
        return Err(CliError::Usage(format!("invalid value {value:?} for {column}")));
    }
    table.apply_filter();
    Ok(())
}

async fn delete(portal: &Portal, kind: TableKind, id: i64, yes: bool) -> Result<(), CliError> {
    match kind {
        TableKind::Parties => {
            let mut parties = portal.parties()?;
            parties.load().await?;
            if confirm_delete(parties.inner_mut(), id, yes)? {
                parties.process_deletes().await?;
            }
        }
        TableKind::Students => delete_row(portal.students()?, id, yes).await?,
        TableKind::Locations => delete_row(portal.locations()?, id, yes).await?,
        TableKind::Accounts => delete_row(portal.accounts()?, id, yes).await?,
    }
    Ok(())
}

async fn delete_row<R: TableResource>(mut table: ResourceTable<R>, id: i64, yes: bool) -> Result<(), CliError> {
    table.load().await?;
    if confirm_delete(&mut table, id, yes)? {
        table.process_deletes().await?;
    }
    Ok(())
}

/// Opens the delete dialog for `id` and confirms it if the user agrees.
fn confirm_delete<R: TableResource>(table: &mut ResourceTable<R>, id: i64, yes: bool) -> Result<bool, CliError> {
    let rows = table.table_mut();
    if !rows.request_delete(&id.to_string()) {
        return Err(CliError::Usage(format!(
            "no deletable {} with id {id}",
            R::NAME.to_lowercase()
        )));
    }
    if let Some(pending) = rows.pending_delete() {
        println!("{}\n{}", pending.dialog.title, pending.dialog.message);
    }
    if !yes && !prompt_yes("Delete? [y/N] ")? {
        rows.cancel_delete();
        println!("Cancelled.");
        return Ok(false);
    }
    Ok(rows.confirm_delete())
}

fn prompt_yes(prompt: &str) -> Result<bool, CliError> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn register(portal: &Portal, args: RegisterArgs) -> Result<(), CliError> {
    let mut parties = portal.parties()?;
    if !parties.inner_mut().table_mut().create_new() {
        return Err(CliError::Usage(format!(
            "the {} portal cannot register parties",
            portal.role()
        )));
    }

    let place = portal.client().place_details(&args.place_id).await?;
    let form = PartyForm {
        party_date: Some(args.date),
        party_time: args.time,
        place_id: place.google_place_id,
        address: place.formatted_address,
        contact_one_id: args.student_id,
        contact_two: ContactFields {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone_number: args.phone,
            contact_preference: ContactPreference::parse(&args.contact_preference),
        },
    };
    portal.sidebar().with_content_mut(|p| p.form = Form::Party(form));

    match parties.submit().await {
        Ok(Some(party)) => {
            println!(
                "Registered party {} at {}",
                party.id, party.location.formatted_address
            );
            Ok(())
        }
        Ok(None) => {
            print_sidebar(portal);
            Err(CliError::Invalid("party"))
        }
        Err(e) => {
            print_sidebar(portal);
            Err(e.into())
        }
    }
}

async fn incident(portal: &Portal, args: IncidentArgs) -> Result<(), CliError> {
    let mut locations = portal.locations()?;
    locations.load().await?;
    let location = locations
        .table()
        .rows()
        .iter()
        .find(|l| l.id == args.location)
        .cloned()
        .ok_or_else(|| CliError::Usage(format!("no location with id {}", args.location)))?;

    let mut log = portal.incidents(&location)?;
    log.table_mut().create_new();
    let form = IncidentForm {
        location_id: location.id,
        incident_date: Some(args.date),
        incident_time: args.time,
        severity: IncidentSeverity::parse(&args.severity),
        description: args.description,
    };
    portal.sidebar().with_content_mut(|p| p.form = Form::Incident(form));

    match log.submit().await {
        Ok(Some(saved)) => {
            println!(
                "Logged {} at {}",
                saved.severity.label().to_lowercase(),
                location.formatted_address
            );
            Ok(())
        }
        Ok(None) => {
            print_sidebar(portal);
            Err(CliError::Invalid("incident"))
        }
        Err(e) => {
            print_sidebar(portal);
            Err(e.into())
        }
    }
}

fn print_sidebar(portal: &Portal) {
    if let Some(text) = portal.sidebar().with_state(render_sidebar) {
        eprint!("{text}");
    }
}

async fn export(portal: &Portal, start: NaiveDate, end: NaiveDate, out: Option<PathBuf>) -> Result<(), CliError> {
    if !portal.role().can_export() {
        return Err(CliError::Usage(format!(
            "the {} portal cannot export parties",
            portal.role()
        )));
    }
    let (start, end) = if end < start { (end, start) } else { (start, end) };
    let file = portal.client().export_parties_csv(start, end).await?;
    let path = out.unwrap_or_else(|| PathBuf::from(&file.filename));
    tokio::fs::write(&path, &file.bytes).await?;
    println!("Saved {} ({} bytes)", path.display(), file.bytes.len());
    Ok(())
}

async fn address(portal: &Portal, input: &str, details: bool) -> Result<(), CliError> {
    let client = portal.client();
    let suggestions = client.autocomplete(input).await?;
    if suggestions.is_empty() {
        println!("No matching addresses.");
        return Ok(());
    }

    if details {
        let lookups = suggestions
            .iter()
            .map(|s| client.place_details(&s.google_place_id));
        for place in futures::future::join_all(lookups).await {
            match place {
                Ok(p) => println!(
                    "{}  {}  ({:.5}, {:.5})",
                    p.google_place_id, p.formatted_address, p.latitude, p.longitude
                ),
                Err(e) => log::warn!("place details failed: {e}"),
            }
        }
    } else {
        for s in suggestions {
            println!("{}  {}", s.google_place_id, s.formatted_address);
        }
    }
    Ok(())
}

async fn whoami(portal: &Portal) -> Result<(), CliError> {
    let student = portal.client().current_student().await?;
    println!("{} <{}>", student.full_name(), student.email);
    println!("PID: {}", student.pid);
    println!(
        "Phone: {} ({})",
        format_phone(&student.phone_number),
        student.contact_preference.label()
    );
    if let Some(at) = student.last_registered {
        println!("Last registered: {}", at.with_timezone(&chrono::Local).format("%m/%d/%Y"));
    }
    Ok(())
}

fn config(settings: &Settings, path: Option<PathBuf>, save: bool) -> Result<(), CliError> {
    let mut shown = settings.clone();
    if shown.token.is_some() {
        shown.token = Some("********".into());
    }
    if shown.refresh_token.is_some() {
        shown.refresh_token = Some("********".into());
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&shown).map_err(SettingsError::from)?
    );

    if save {
        let path = path.ok_or_else(|| CliError::Usage("no settings location on this platform".into()))?;
        settings.save(&path)?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_filters() {
        let cli = Cli::try_parse_from([
            "partyreg",
            "--role",
            "police",
            "list",
            "parties",
            "--filter",
            "date=2025-04-01..2025-04-30",
            "--filter",
            "time=21:30",
            "--sort",
            "date:desc",
            "--page",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.role, Some(Role::Police));
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.table, TableKind::Parties);
        assert_eq!(args.filters.len(), 2);
        assert_eq!(args.page, 2);
    }

    #[test]
    fn test_near_requires_dates() {
        let result = Cli::try_parse_from(["partyreg", "list", "parties", "--near", "ChIJ-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "partyreg",
            "--api-url",
            "https://flag.example.edu/api",
            "--page-size",
            "10",
            "whoami",
        ])
        .unwrap();
        let settings = cli.apply_to(Settings::default());
        assert_eq!(settings.api_url, "https://flag.example.edu/api");
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.role, Role::Staff);
    }

    #[test]
    fn test_export_dates_parse() {
        let cli = Cli::try_parse_from([
            "partyreg", "export", "--start", "2025-01-01", "--end", "2025-05-31",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Export { out: None, .. }));
    }
}
