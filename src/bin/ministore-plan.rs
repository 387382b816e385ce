#![forbid(unsafe_code)]
use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use ministore_schedule::{
    calendar::{self, format_date, DateFallback},
    io,
    model::{Role, Shift, ShiftId, ShiftTemplate, StaffId},
    planning::{self, CopyRequest, ShiftAction},
    rules::{self, RuleSet},
    storage::{JsonStorage, Storage, TemplateStore},
    table::ScheduleTable,
    timefmt,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Outils de planning MiniStore (semaines, règles de shift, semaines types)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Snapshot JSON du planning (réponse de /shift-planning ou snapshot complet)
    #[arg(long, global = true, default_value = "schedule.json")]
    snapshot: String,

    /// Date du jour (YYYY-MM-DD), par défaut la date locale
    #[arg(long, global = true)]
    today: Option<String>,

    /// Refuse les dates illisibles au lieu de les remplacer par aujourd'hui
    #[arg(long, global = true)]
    strict_dates: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Afficher les sept jours de la semaine ISO d'une date
    Week {
        #[arg(long)]
        date: Option<String>,
    },

    /// Projeter des dates hebdomadaires jusqu'à une date limite
    Project {
        /// liste "YYYY-MM-DD,YYYY-MM-DD,..."
        #[arg(long)]
        dates: String,
        #[arg(long)]
        until: String,
    },

    /// Même jour de semaine que --reference, dans la semaine de --target
    SameWeekday {
        #[arg(long)]
        reference: String,
        #[arg(long)]
        target: String,
    },

    /// Évaluer les règles de chaque shift du snapshot
    Check {
        /// Semaine affichée si le snapshot est une réponse brute
        #[arg(long)]
        week_of: Option<String>,
        /// Export CSV des règles non respectées (optionnel)
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier si un shift peut être déplacé vers (staff, date)
    CanMove {
        #[arg(long)]
        shift: u64,
        /// username du staff cible
        #[arg(long)]
        staff: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        week_of: Option<String>,
    },

    /// Contrôler un shift saisi (création ou modification) avant envoi
    NewShift {
        /// id du staff
        #[arg(long)]
        staff: u64,
        #[arg(long)]
        date: String,
        /// Modifier ce shift au lieu d'en créer un
        #[arg(long, conflicts_with = "shift_template")]
        edit: Option<u64>,
        /// Modèle de shift JSON pour pré-remplir le formulaire
        #[arg(long)]
        shift_template: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// "08:00" ou "8:00am"
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        publish: bool,
        #[arg(long)]
        week_of: Option<String>,
        /// Fichier JSON de sortie (POST /shifts/add)
        #[arg(long)]
        out: Option<String>,
    },

    /// Copier un shift sur d'autres jours, éventuellement chaque semaine
    CopyShift {
        #[arg(long)]
        shift: u64,
        /// liste "YYYY-MM-DD,..."
        #[arg(long)]
        days: String,
        #[arg(long)]
        until: Option<String>,
        #[arg(long)]
        publish: bool,
        #[arg(long)]
        week_of: Option<String>,
        /// Fichier JSON de sortie (POST /shifts/add/multiple)
        #[arg(long)]
        out: String,
    },

    /// Appliquer une semaine type à la semaine d'une date
    ApplyTemplate {
        /// Fichier JSON de la semaine type
        #[arg(long, conflicts_with = "id")]
        template: Option<String>,
        /// Id d'une semaine type du répertoire --dir
        #[arg(long)]
        id: Option<u64>,
        #[arg(long, default_value = "templates")]
        dir: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        out: String,
    },

    /// Recopier la semaine du snapshot vers la semaine d'une date
    CopyWeek {
        #[arg(long)]
        date: String,
        #[arg(long)]
        week_of: Option<String>,
        #[arg(long)]
        out: String,
    },

    /// Gérer les semaines types enregistrées
    Templates {
        #[command(subcommand)]
        cmd: TemplateCommands,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    /// Enregistrer la semaine du snapshot comme semaine type
    Capture {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "templates")]
        dir: String,
        #[arg(long)]
        week_of: Option<String>,
    },
    /// Lister les semaines types
    List {
        #[arg(long, default_value = "templates")]
        dir: String,
    },
}

struct Dates {
    today: NaiveDate,
    policy: DateFallback,
}

impl Dates {
    fn resolve(&self, raw: Option<&str>) -> Result<NaiveDate> {
        Ok(calendar::resolve_date(raw, self.today, self.policy)?)
    }
}

/// Les dates de travail (jours choisis, limites) sont toujours strictes.
fn strict_date(raw: &str) -> Result<NaiveDate> {
    Ok(calendar::parse_date(raw)?)
}

fn date_list(raw: &str) -> Result<Vec<NaiveDate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(strict_date)
        .collect()
}

fn parse_time(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(&timefmt::readable_to_time(raw), "%H:%M:%S"))
        .with_context(|| format!("invalid time: {raw}"))
}

fn load_table(cli_snapshot: &str, dates: &Dates, week_of: Option<&str>) -> Result<ScheduleTable> {
    let week_of = dates.resolve(week_of)?;
    let snapshot = io::load_snapshot_json(cli_snapshot, week_of)?;
    Ok(ScheduleTable::from_snapshot(snapshot))
}

fn warn_past_days(picked: NaiveDate, today: NaiveDate) {
    if planning::week_has_past_days(picked, today) {
        eprintln!("Warning: the chosen week has past days, only upcoming days get shifts");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let dates = Dates {
        today: match cli.today.as_deref() {
            Some(raw) => calendar::parse_date(raw).context("--today")?,
            None => calendar::today(),
        },
        policy: if cli.strict_dates {
            DateFallback::Strict
        } else {
            DateFallback::Today
        },
    };

    let code = match cli.cmd {
        Commands::Week { date } => {
            let date = dates.resolve(date.as_deref())?;
            for day in calendar::week_dates(date) {
                println!("{} {}", format_date(day), day.format("%a"));
            }
            0
        }
        Commands::Project { dates: raw, until } => {
            let bases = date_list(&raw)?;
            let until = strict_date(&until)?;
            for date in calendar::dates_until_strings(&bases, until, dates.today) {
                println!("{date}");
            }
            0
        }
        Commands::SameWeekday { reference, target } => {
            let reference = strict_date(&reference)?;
            let target = dates.resolve(Some(&target))?;
            println!("{}", format_date(calendar::same_weekday(reference, target)));
            0
        }
        Commands::Check { week_of, out_csv } => {
            let mut table = load_table(&cli.snapshot, &dates, week_of.as_deref())?;
            let evaluations = rules::evaluate_table(&mut table, &RuleSet::default());
            let violations: Vec<_> = evaluations.iter().filter(|e| e.is_violation()).collect();
            if let Some(path) = out_csv {
                io::export_violations_csv(path, &table, &evaluations)?;
            }
            if violations.is_empty() {
                println!("OK: {} shift(s), no rule violated", evaluations.len());
                0
            } else {
                for evaluation in &violations {
                    let (name, times) = table
                        .shift(evaluation.shift)
                        .map(|s| (s.name.as_str(), timefmt::shift_times(s.start_time, s.end_time)))
                        .unwrap_or(("?", String::new()));
                    let username = table
                        .staff(evaluation.staff)
                        .map(|s| s.username.as_str())
                        .unwrap_or("-");
                    let failed: Vec<_> = evaluation.failures().map(|r| r.error_name.as_str()).collect();
                    let holiday = table
                        .holiday_on(evaluation.date)
                        .map(|h| format!(" ({})", h.name))
                        .unwrap_or_default();
                    println!(
                        "{} | {} {} | {} | {}{} | {}",
                        evaluation.shift,
                        name,
                        times,
                        username,
                        evaluation.date,
                        holiday,
                        failed.join(", ")
                    );
                }
                eprintln!("Found {} shift(s) violating rules", violations.len());
                // Code 2 = WARNING
                2
            }
        }
        Commands::CanMove {
            shift,
            staff,
            date,
            week_of,
        } => {
            let table = load_table(&cli.snapshot, &dates, week_of.as_deref())?;
            let target_date = strict_date(&date)?;
            let staff_id = table
                .find_staff_by_username(&staff)
                .map(|s| s.staff_id)
                .ok_or_else(|| anyhow::anyhow!("unknown staff: {}", staff))?;
            let target = table
                .cell_for(staff_id, target_date)
                .ok_or_else(|| anyhow::anyhow!("{} is not a displayed date", target_date))?;
            let errors = rules::move_errors(&table, ShiftId(shift), &target, dates.today)?;
            if errors.is_empty() {
                println!("OK: shift {shift} can move to {target}");
                0
            } else {
                for error in &errors {
                    println!("{}: {}", error.id, error.error_name);
                }
                2
            }
        }
        Commands::NewShift {
            staff,
            date,
            edit,
            shift_template,
            name,
            start,
            end,
            role,
            publish,
            week_of,
            out,
        } => {
            let table = load_table(&cli.snapshot, &dates, week_of.as_deref())?;
            let date = strict_date(&date)?;
            let (mut shift, action) = match (edit, shift_template) {
                (Some(id), _) => {
                    let existing = table
                        .shift(ShiftId(id))
                        .cloned()
                        .ok_or_else(|| anyhow!("unknown shift: {}", id))?;
                    (existing, ShiftAction::Edit)
                }
                (None, Some(path)) => {
                    let template: ShiftTemplate = JsonStorage::open(&path)?.load()?;
                    (template.draft(date), ShiftAction::Create)
                }
                (None, None) => {
                    let required = |value: &Option<String>, flag: &str| {
                        value
                            .clone()
                            .ok_or_else(|| anyhow!("{flag} is required to create a shift"))
                    };
                    let draft = Shift::draft(
                        required(&name, "--name")?,
                        date,
                        parse_time(&required(&start, "--start")?)?,
                        parse_time(&required(&end, "--end")?)?,
                        Role::AllRoles,
                    );
                    (draft, ShiftAction::Create)
                }
            };
            if let Some(name) = name {
                shift.name = name;
            }
            if let Some(start) = start.as_deref() {
                shift.start_time = parse_time(start)?;
            }
            if let Some(end) = end.as_deref() {
                shift.end_time = parse_time(end)?;
            }
            if let Some(role) = role {
                shift.role = role;
            }
            shift.published = publish;

            let checked = planning::validate_shift(
                &table,
                &RuleSet::default(),
                &shift,
                StaffId(staff),
                date,
                action,
                dates.today,
            );
            match checked {
                Ok(payload) => {
                    if let Some(out) = out {
                        JsonStorage::open(&out)?.save(&payload)?;
                    }
                    println!(
                        "OK: {} on {} ({}) for staff {}",
                        payload.name,
                        format_date(payload.date),
                        timefmt::shift_times(payload.start_time, payload.end_time),
                        staff
                    );
                    0
                }
                Err(err) => {
                    eprintln!("{err}");
                    2
                }
            }
        }
        Commands::CopyShift {
            shift,
            days,
            until,
            publish,
            week_of,
            out,
        } => {
            let table = load_table(&cli.snapshot, &dates, week_of.as_deref())?;
            let source = table
                .shift(ShiftId(shift))
                .ok_or_else(|| anyhow::anyhow!("unknown shift: {}", shift))?;
            let request = CopyRequest {
                days: date_list(&days)?,
                until: until.as_deref().map(strict_date).transpose()?,
                publish,
            };
            let shifts = planning::copy_shift(source, &request, dates.today)?;
            io::export_new_shifts_json(&out, &shifts)?;
            println!("{} shift(s) written to {}", shifts.len(), out);
            0
        }
        Commands::ApplyTemplate {
            template,
            id,
            dir,
            date,
            out,
        } => {
            let template = match (template, id) {
                (Some(path), _) => io::load_schedule_template(path)?,
                (None, Some(id)) => TemplateStore::new(&dir).load(id)?,
                (None, None) => bail!("either --template or --id is required"),
            };
            let picked = dates.resolve(Some(&date))?;
            warn_past_days(picked, dates.today);
            let shifts = planning::apply_schedule_template(&template, picked, dates.today);
            io::export_new_shifts_json(&out, &shifts)?;
            println!(
                "{} of {} template shift(s) written to {}",
                shifts.len(),
                template.num_of_shifts(),
                out
            );
            0
        }
        Commands::CopyWeek { date, week_of, out } => {
            let table = load_table(&cli.snapshot, &dates, week_of.as_deref())?;
            let picked = dates.resolve(Some(&date))?;
            warn_past_days(picked, dates.today);
            let shifts = planning::copy_week(&table, picked, dates.today);
            io::export_new_shifts_json(&out, &shifts)?;
            println!("{} shift(s) written to {}", shifts.len(), out);
            0
        }
        Commands::Templates { cmd } => match cmd {
            TemplateCommands::Capture {
                name,
                description,
                dir,
                week_of,
            } => {
                let table = load_table(&cli.snapshot, &dates, week_of.as_deref())?;
                let mut template = planning::capture_week_template(&table, &name, &description)?;
                let path = TemplateStore::new(&dir).save(&mut template)?;
                println!(
                    "Template {} ({} shift(s)) saved to {}",
                    template.schedule_template_id,
                    template.num_of_shifts(),
                    path.display()
                );
                0
            }
            TemplateCommands::List { dir } => {
                for template in TemplateStore::new(&dir).list()? {
                    println!(
                        "{} | {} | {} shift(s)",
                        template.schedule_template_id,
                        template.name,
                        template.num_of_shifts()
                    );
                }
                0
            }
        },
    };

    std::process::exit(code);
}
