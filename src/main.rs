use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use site_safety::{
    attachments::PhotoStore,
    config::{self, AppConfig},
    db::{self, DbPool},
    entities::{
        hazard::{self, HazardStatus, Severity},
        incident, maintenance_log, mitigation_note, shift, trail_cam_capture, transaction,
    },
    notifications,
    reports::ExportFormat,
    services::{
        hazards::{HazardFilter, HazardLocation, HazardUpdate, NewHazard, NewMitigationNote, RowOutcome},
        inventory::{CheckIn, CheckOut, ItemFields, ItemView},
        maintenance::NewMaintenance,
        patrols::{NewIncident, NewShift},
        trail_cams::NewCaptures,
        AppServices, DateRange,
    },
};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    let outcome = match cli.command {
        Commands::Hazards(command) => handle_hazards_command(&context, command, cli.json).await,
        Commands::Notes(command) => handle_notes_command(&context, command, cli.json).await,
        Commands::Shifts(command) => handle_shifts_command(&context, command, cli.json).await,
        Commands::Incidents(command) => handle_incidents_command(&context, command, cli.json).await,
        Commands::Items(command) => handle_items_command(&context, command, cli.json).await,
        Commands::Maintenance(command) => {
            handle_maintenance_command(&context, command, cli.json).await
        }
        Commands::Trailcams(command) => handle_trailcams_command(&context, command, cli.json).await,
    };

    context.shutdown().await;
    outcome
}

#[derive(Parser)]
#[command(name = "site-safety", about = "Site safety records: hazards, patrols, equipment", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Hazards(HazardsCommands),
    #[command(subcommand)]
    Notes(NotesCommands),
    #[command(subcommand)]
    Shifts(ShiftsCommands),
    #[command(subcommand)]
    Incidents(IncidentsCommands),
    #[command(subcommand)]
    Items(ItemsCommands),
    #[command(subcommand)]
    Maintenance(MaintenanceCommands),
    #[command(subcommand)]
    Trailcams(TrailcamsCommands),
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatArg {
    Csv,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

#[derive(Args)]
struct ExportArgs {
    #[arg(long, help = "File to write the export to")]
    out: PathBuf,
    #[arg(long, value_enum, help = "Output format; inferred from the file extension when omitted")]
    format: Option<FormatArg>,
}

impl ExportArgs {
    fn resolve_format(&self) -> ExportFormat {
        match self.format {
            Some(format) => format.into(),
            None => self
                .out
                .extension()
                .and_then(|e| e.to_str())
                .and_then(|e| e.parse::<ExportFormat>().ok())
                .unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
enum HazardsCommands {
    Report(ReportHazardArgs),
    Get(IdArg),
    Update(UpdateHazardArgs),
    Photo(PhotoArgs),
    List(HazardFilterArgs),
    Export {
        #[command(flatten)]
        filter: HazardFilterArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
    Import {
        #[arg(help = "CSV file with a header row")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct ReportHazardArgs {
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
    #[arg(long, conflicts_with_all = ["lat", "lon"], help = "Free-text location instead of coordinates")]
    location: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    severity: Option<Severity>,
    #[arg(long)]
    status: Option<HazardStatus>,
    #[arg(long)]
    photo: Option<PathBuf>,
}

#[derive(Args)]
struct UpdateHazardArgs {
    id: i32,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    severity: Option<Severity>,
    #[arg(long)]
    status: Option<HazardStatus>,
}

#[derive(Args)]
struct HazardFilterArgs {
    #[arg(long)]
    severity: Option<Severity>,
    #[arg(long)]
    status: Option<HazardStatus>,
}

impl From<&HazardFilterArgs> for HazardFilter {
    fn from(args: &HazardFilterArgs) -> Self {
        HazardFilter {
            severity: args.severity,
            status: args.status,
        }
    }
}

#[derive(Args)]
struct IdArg {
    id: i32,
}

#[derive(Args)]
struct PhotoArgs {
    id: i32,
    path: PathBuf,
}

#[derive(Subcommand)]
enum NotesCommands {
    Add {
        hazard_id: i32,
        #[arg(long)]
        text: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    List {
        hazard_id: i32,
    },
}

#[derive(Subcommand)]
enum ShiftsCommands {
    Add {
        #[arg(long, help = "Shift date (YYYY-MM-DD)")]
        date: NaiveDate,
        #[arg(long, help = "Time slot, e.g. 08:00-16:00")]
        slot: String,
        #[arg(long)]
        crew: String,
    },
    List {
        #[arg(long)]
        date: NaiveDate,
    },
    Delete(IdArg),
}

#[derive(Subcommand)]
enum IncidentsCommands {
    Log(LogIncidentArgs),
    List {
        #[arg(long, conflicts_with = "shift", required_unless_present = "shift")]
        date: Option<NaiveDate>,
        #[arg(long)]
        shift: Option<i32>,
    },
    Delete(IdArg),
    Export(ExportArgs),
}

#[derive(Args)]
struct LogIncidentArgs {
    #[arg(long)]
    shift: i32,
    #[arg(long)]
    category: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    photo: Option<PathBuf>,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,
    #[arg(long, help = "When it happened (RFC 3339); defaults to now")]
    at: Option<DateTime<Utc>>,
}

#[derive(Subcommand)]
enum ItemsCommands {
    Add(AddItemArgs),
    Update(UpdateItemArgs),
    Delete(IdArg),
    Get(IdArg),
    Search {
        term: Option<String>,
    },
    LowStock,
    Checkout(CheckoutArgs),
    Checkin {
        transaction_id: i32,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    History {
        #[arg(long)]
        item: Option<i32>,
    },
    Export {
        #[arg(long)]
        term: Option<String>,
        #[command(flatten)]
        export: ExportArgs,
    },
    ExportHistory {
        #[arg(long, help = "First out date to include (YYYY-MM-DD)")]
        from: Option<NaiveDate>,
        #[arg(long, help = "Last out date to include (YYYY-MM-DD)")]
        to: Option<NaiveDate>,
        #[command(flatten)]
        export: ExportArgs,
    },
}

#[derive(Args)]
struct AddItemArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    category: String,
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value_t = 0)]
    quantity: i32,
    #[arg(long, default_value = "")]
    unit: String,
    #[arg(long, default_value_t = 0)]
    threshold: i32,
    #[arg(long)]
    supplier: Option<String>,
    #[arg(long)]
    supplier_contact: Option<String>,
    #[arg(long)]
    supplier_sku: Option<String>,
    #[arg(long)]
    unit_cost: Option<f64>,
}

impl From<AddItemArgs> for ItemFields {
    fn from(args: AddItemArgs) -> Self {
        ItemFields {
            name: args.name,
            category: args.category,
            location: args.location,
            quantity: args.quantity,
            unit: args.unit,
            threshold: args.threshold,
            supplier: args.supplier,
            supplier_contact: args.supplier_contact,
            supplier_sku: args.supplier_sku,
            unit_cost: args.unit_cost,
        }
    }
}

#[derive(Args)]
struct UpdateItemArgs {
    id: i32,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    quantity: Option<i32>,
    #[arg(long)]
    unit: Option<String>,
    #[arg(long)]
    threshold: Option<i32>,
    #[arg(long)]
    supplier: Option<String>,
    #[arg(long)]
    supplier_contact: Option<String>,
    #[arg(long)]
    supplier_sku: Option<String>,
    #[arg(long)]
    unit_cost: Option<f64>,
}

#[derive(Args)]
struct CheckoutArgs {
    item_id: i32,
    #[arg(long)]
    person: String,
    #[arg(long, help = "Expected return date (YYYY-MM-DD)")]
    expected: Option<NaiveDate>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    photo: Option<PathBuf>,
}

#[derive(Subcommand)]
enum MaintenanceCommands {
    Log {
        #[arg(long)]
        equipment: String,
        #[arg(long)]
        issue: String,
        #[arg(long, action = ArgAction::SetTrue)]
        done: bool,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    Done(IdArg),
    List(MaintenanceFilterArgs),
    Export {
        #[command(flatten)]
        filter: MaintenanceFilterArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
}

#[derive(Args)]
struct MaintenanceFilterArgs {
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "resolved", help = "Only open entries")]
    open: bool,
    #[arg(long, action = ArgAction::SetTrue, help = "Only resolved entries")]
    resolved: bool,
}

impl MaintenanceFilterArgs {
    fn done(&self) -> Option<bool> {
        match (self.open, self.resolved) {
            (true, _) => Some(false),
            (_, true) => Some(true),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
enum TrailcamsCommands {
    Add {
        #[arg(long)]
        location: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(required = true, help = "Photo files, one capture each")]
        photos: Vec<PathBuf>,
    },
    List,
    Export(ExportArgs),
}

struct CliContext {
    _config: AppConfig,
    db: Arc<DbPool>,
    services: AppServices,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        db::check_connection(&db_pool)
            .await
            .context("database is not reachable")?;
        if config.auto_migrate {
            db::run_migrations(&db_pool)
                .await
                .context("failed to run database migrations")?;
        }
        let db = Arc::new(db_pool);

        let notifier =
            notifications::sink_from_config(&config).context("failed to set up notifications")?;
        let photos = PhotoStore::new(config.attachments_dir());
        debug!(root = %photos.root().display(), "Attachments directory");

        let services = AppServices::new(db.clone(), photos, notifier);

        Ok(Self {
            _config: config,
            db,
            services,
        })
    }

    async fn shutdown(self) {
        drop(self.services);
        if let Ok(pool) = Arc::try_unwrap(self.db) {
            if let Err(e) = db::close_pool(pool).await {
                debug!(error = %e, "Database pool did not close cleanly");
            }
        }
    }
}

async fn handle_hazards_command(
    context: &CliContext,
    command: HazardsCommands,
    json: bool,
) -> Result<()> {
    let service = &context.services.hazards;
    match command {
        HazardsCommands::Report(args) => {
            let location = match (args.lat, args.lon, args.location) {
                (Some(latitude), Some(longitude), _) => HazardLocation::Coordinates {
                    latitude,
                    longitude,
                },
                (_, _, Some(name)) => HazardLocation::Named(name),
                _ => return Err(anyhow!("either --lat/--lon or --location is required")),
            };
            let hazard = service
                .report_hazard(NewHazard {
                    location,
                    description: args.description,
                    severity: args.severity,
                    status: args.status,
                    photo: args.photo,
                })
                .await
                .context("failed to report hazard")?;
            output(json, &hazard, render_hazard)
        }
        HazardsCommands::Get(args) => {
            let hazard = service
                .get_hazard(args.id)
                .await
                .with_context(|| format!("failed to fetch hazard {}", args.id))?;
            output(json, &hazard, render_hazard)
        }
        HazardsCommands::Update(args) => {
            let current = service
                .get_hazard(args.id)
                .await
                .with_context(|| format!("failed to fetch hazard {}", args.id))?;
            let hazard = service
                .update_hazard(
                    args.id,
                    HazardUpdate {
                        description: args.description.unwrap_or(current.description),
                        severity: args.severity.unwrap_or(current.severity),
                        status: args.status.unwrap_or(current.status),
                    },
                )
                .await
                .with_context(|| format!("failed to update hazard {}", args.id))?;
            output(json, &hazard, render_hazard)
        }
        HazardsCommands::Photo(args) => {
            let hazard = service
                .attach_hazard_photo(args.id, args.path)
                .await
                .with_context(|| format!("failed to attach photo to hazard {}", args.id))?;
            output(json, &hazard, render_hazard)
        }
        HazardsCommands::List(args) => {
            let hazards = service
                .list_hazards(&HazardFilter::from(&args))
                .await
                .context("failed to list hazards")?;
            output_list(json, &hazards, "No hazards match", render_hazard)
        }
        HazardsCommands::Export { filter, export } => {
            let bytes = service
                .export_hazards(&HazardFilter::from(&filter), export.resolve_format())
                .await
                .context("failed to export hazards")?;
            write_export(&export.out, &bytes)
        }
        HazardsCommands::Import { path } => {
            let file = fs::File::open(&path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            let report = service
                .import_csv(file)
                .await
                .context("failed to import hazards")?;
            if json {
                return print_json(&report);
            }
            println!(
                "Imported {} hazard(s), rejected {}",
                report.imported(),
                report.rejected()
            );
            for outcome in &report.outcomes {
                if let RowOutcome::Rejected { row, reason } = outcome {
                    println!("  row {}: {}", row, reason);
                }
            }
            Ok(())
        }
    }
}

async fn handle_notes_command(
    context: &CliContext,
    command: NotesCommands,
    json: bool,
) -> Result<()> {
    let service = &context.services.hazards;
    match command {
        NotesCommands::Add {
            hazard_id,
            text,
            author,
            photo,
        } => {
            let note = service
                .add_mitigation_note(NewMitigationNote {
                    hazard_id,
                    note_text: text,
                    author,
                    photo,
                })
                .await
                .with_context(|| format!("failed to add note to hazard {}", hazard_id))?;
            output(json, &note, render_note)
        }
        NotesCommands::List { hazard_id } => {
            let notes = service
                .list_mitigation_notes(hazard_id)
                .await
                .with_context(|| format!("failed to list notes for hazard {}", hazard_id))?;
            output_list(json, &notes, "No notes yet", render_note)
        }
    }
}

async fn handle_shifts_command(
    context: &CliContext,
    command: ShiftsCommands,
    json: bool,
) -> Result<()> {
    let service = &context.services.patrols;
    match command {
        ShiftsCommands::Add { date, slot, crew } => {
            let shift = service
                .add_shift(NewShift {
                    date,
                    time_slot: slot,
                    crew,
                })
                .await
                .context("failed to add shift")?;
            output(json, &shift, render_shift)
        }
        ShiftsCommands::List { date } => {
            let shifts = service
                .list_shifts_by_date(date)
                .await
                .with_context(|| format!("failed to list shifts for {}", date))?;
            output_list(json, &shifts, "No shifts scheduled", render_shift)
        }
        ShiftsCommands::Delete(args) => {
            service
                .delete_shift(args.id)
                .await
                .with_context(|| format!("failed to delete shift {}", args.id))?;
            println!("Shift {} deleted", args.id);
            Ok(())
        }
    }
}

async fn handle_incidents_command(
    context: &CliContext,
    command: IncidentsCommands,
    json: bool,
) -> Result<()> {
    let service = &context.services.patrols;
    match command {
        IncidentsCommands::Log(args) => {
            let incident = service
                .log_incident(NewIncident {
                    shift_id: args.shift,
                    category: args.category,
                    description: args.description,
                    photo: args.photo,
                    latitude: args.lat,
                    longitude: args.lon,
                    occurred_at: args.at,
                })
                .await
                .context("failed to log incident")?;
            output(json, &incident, render_incident)
        }
        IncidentsCommands::List { date, shift } => {
            let incidents = match (date, shift) {
                (_, Some(shift_id)) => service.list_incidents_for_shift(shift_id).await,
                (Some(date), None) => service.list_incidents_by_date(date).await,
                (None, None) => return Err(anyhow!("either --date or --shift is required")),
            }
            .context("failed to list incidents")?;
            output_list(json, &incidents, "No incidents", render_incident)
        }
        IncidentsCommands::Delete(args) => {
            service
                .delete_incident(args.id)
                .await
                .with_context(|| format!("failed to delete incident {}", args.id))?;
            println!("Incident {} deleted", args.id);
            Ok(())
        }
        IncidentsCommands::Export(export) => {
            let bytes = service
                .export_incidents(export.resolve_format())
                .await
                .context("failed to export incidents")?;
            write_export(&export.out, &bytes)
        }
    }
}

async fn handle_items_command(
    context: &CliContext,
    command: ItemsCommands,
    json: bool,
) -> Result<()> {
    let service = &context.services.inventory;
    match command {
        ItemsCommands::Add(args) => {
            let item = service
                .add_item(args.into())
                .await
                .context("failed to add item")?;
            output(json, &ItemView::from(item), render_item)
        }
        ItemsCommands::Update(args) => {
            let current = service
                .get_item(args.id)
                .await
                .with_context(|| format!("failed to fetch item {}", args.id))?;
            let fields = ItemFields {
                name: args.name.unwrap_or(current.name),
                category: args.category.unwrap_or(current.category),
                location: args.location.unwrap_or(current.location),
                quantity: args.quantity.unwrap_or(current.quantity),
                unit: args.unit.unwrap_or(current.unit),
                threshold: args.threshold.unwrap_or(current.threshold),
                supplier: args.supplier.or(current.supplier),
                supplier_contact: args.supplier_contact.or(current.supplier_contact),
                supplier_sku: args.supplier_sku.or(current.supplier_sku),
                unit_cost: args.unit_cost.or(current.unit_cost),
            };
            let item = service
                .update_item(args.id, fields)
                .await
                .with_context(|| format!("failed to update item {}", args.id))?;
            output(json, &ItemView::from(item), render_item)
        }
        ItemsCommands::Delete(args) => {
            service
                .delete_item(args.id)
                .await
                .with_context(|| format!("failed to delete item {}", args.id))?;
            println!("Item {} deleted", args.id);
            Ok(())
        }
        ItemsCommands::Get(args) => {
            let item = service
                .get_item(args.id)
                .await
                .with_context(|| format!("failed to fetch item {}", args.id))?;
            output(json, &ItemView::from(item), render_item)
        }
        ItemsCommands::Search { term } => {
            let items = service
                .search_items(term.as_deref())
                .await
                .context("failed to search items")?;
            output_list(json, &items, "No items match", render_item)
        }
        ItemsCommands::LowStock => {
            let entries = service
                .low_stock_report()
                .await
                .context("failed to build low-stock report")?;
            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("All items are above their thresholds");
            }
            for entry in &entries {
                println!(
                    "- {} • qty {} • threshold {}",
                    entry.name, entry.quantity, entry.threshold
                );
            }
            Ok(())
        }
        ItemsCommands::Checkout(args) => {
            let row = service
                .check_out(CheckOut {
                    item_id: args.item_id,
                    person: args.person,
                    expected_return_date: args.expected,
                    notes: args.notes,
                    photo: args.photo,
                })
                .await
                .with_context(|| format!("failed to check out item {}", args.item_id))?;
            output(json, &row, render_transaction)
        }
        ItemsCommands::Checkin {
            transaction_id,
            notes,
            photo,
        } => {
            let row = service
                .check_in(transaction_id, CheckIn { notes, photo })
                .await
                .with_context(|| format!("failed to check in transaction {}", transaction_id))?;
            output(json, &row, render_transaction)
        }
        ItemsCommands::History { item } => {
            let rows = service
                .history(item)
                .await
                .context("failed to load transaction history")?;
            output_list(json, &rows, "No transactions", render_transaction)
        }
        ItemsCommands::Export { term, export } => {
            let bytes = service
                .export_items(term.as_deref(), export.resolve_format())
                .await
                .context("failed to export items")?;
            write_export(&export.out, &bytes)
        }
        ItemsCommands::ExportHistory { from, to, export } => {
            let bytes = service
                .export_history(&DateRange::new(from, to), export.resolve_format())
                .await
                .context("failed to export transaction history")?;
            write_export(&export.out, &bytes)
        }
    }
}

async fn handle_maintenance_command(
    context: &CliContext,
    command: MaintenanceCommands,
    json: bool,
) -> Result<()> {
    let service = &context.services.maintenance;
    match command {
        MaintenanceCommands::Log {
            equipment,
            issue,
            done,
            notes,
            photo,
        } => {
            let entry = service
                .log_maintenance(NewMaintenance {
                    equipment,
                    issue,
                    done,
                    notes,
                    photo,
                })
                .await
                .context("failed to log maintenance issue")?;
            output(json, &entry, render_maintenance)
        }
        MaintenanceCommands::Done(args) => {
            let entry = service
                .mark_maintenance_done(args.id)
                .await
                .with_context(|| format!("failed to resolve maintenance entry {}", args.id))?;
            output(json, &entry, render_maintenance)
        }
        MaintenanceCommands::List(filter) => {
            let entries = service
                .list_maintenance(filter.done())
                .await
                .context("failed to list maintenance log")?;
            output_list(json, &entries, "No maintenance entries", render_maintenance)
        }
        MaintenanceCommands::Export { filter, export } => {
            let bytes = service
                .export_maintenance(filter.done(), export.resolve_format())
                .await
                .context("failed to export maintenance log")?;
            write_export(&export.out, &bytes)
        }
    }
}

async fn handle_trailcams_command(
    context: &CliContext,
    command: TrailcamsCommands,
    json: bool,
) -> Result<()> {
    let service = &context.services.trail_cams;
    match command {
        TrailcamsCommands::Add {
            location,
            notes,
            photos,
        } => {
            let captures = service
                .add_captures(NewCaptures {
                    location,
                    photos,
                    notes,
                })
                .await
                .context("failed to store trail camera captures")?;
            output_list(json, &captures, "No captures stored", render_capture)
        }
        TrailcamsCommands::List => {
            let captures = service
                .list_captures()
                .await
                .context("failed to list trail camera captures")?;
            output_list(json, &captures, "No captures", render_capture)
        }
        TrailcamsCommands::Export(export) => {
            let bytes = service
                .export_captures(export.resolve_format())
                .await
                .context("failed to export trail camera captures")?;
            write_export(&export.out, &bytes)
        }
    }
}

fn output<T: Serialize>(json: bool, value: &T, render: fn(&T)) -> Result<()> {
    if json {
        print_json(value)
    } else {
        render(value);
        Ok(())
    }
}

fn output_list<T: Serialize>(json: bool, values: &[T], empty: &str, render: fn(&T)) -> Result<()> {
    if json {
        return print_json(&values);
    }
    if values.is_empty() {
        println!("{}", empty);
    }
    for value in values {
        render(value);
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_export(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn render_hazard(hazard: &hazard::Model) {
    let place = match (hazard.latitude, hazard.longitude, hazard.location.as_deref()) {
        (Some(lat), Some(lon), _) => format!("{:.5}, {:.5}", lat, lon),
        (_, _, Some(name)) => name.to_string(),
        _ => "-".to_string(),
    };
    println!(
        "- Hazard {} • {} • {} • {} • {} • {}",
        hazard.id,
        hazard.severity,
        hazard.status,
        place,
        hazard.reported_at.format("%Y-%m-%d %H:%M"),
        hazard.description
    );
}

fn render_note(note: &mitigation_note::Model) {
    println!(
        "- Note {} • {} • {} • {}",
        note.id,
        note.author,
        note.created_at.format("%Y-%m-%d %H:%M"),
        note.note_text
    );
}

fn render_shift(shift: &shift::Model) {
    println!(
        "- Shift {} • {} • {} • crew {}",
        shift.id, shift.date, shift.time_slot, shift.crew
    );
}

fn render_incident(incident: &incident::Model) {
    println!(
        "- Incident {} • shift {} • {} • {} • {}",
        incident.id,
        incident.shift_id,
        incident.category,
        incident.occurred_at.format("%Y-%m-%d %H:%M"),
        incident.description
    );
}

fn render_item(view: &ItemView) {
    let item = &view.item;
    println!(
        "- Item {} • {} • {} • qty {} {} • threshold {}{}",
        item.id,
        item.name,
        item.category,
        item.quantity,
        item.unit,
        item.threshold,
        if view.low_stock { " • LOW STOCK" } else { "" }
    );
}

fn render_transaction(row: &transaction::Model) {
    println!(
        "- Transaction {} • item {} • {} • out {} • {}",
        row.id,
        row.item_id,
        row.person,
        row.out_date.format("%Y-%m-%d %H:%M"),
        row.status
    );
}

fn render_maintenance(entry: &maintenance_log::Model) {
    println!(
        "- Maintenance {} • {} • {} • {}",
        entry.id,
        entry.equipment,
        if entry.done { "done" } else { "open" },
        entry.issue
    );
}

fn render_capture(capture: &trail_cam_capture::Model) {
    println!(
        "- Capture {} • {} • {} • {}",
        capture.id,
        capture.location,
        capture.captured_at.format("%Y-%m-%d %H:%M"),
        capture.photo_path
    );
}
