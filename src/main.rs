//! Command-line front end for the clinic agenda.
//!
//! One-shot subcommands print a view of the demo clinic; `interactive` runs a
//! menu loop over the same page the subcommands use.

use anyhow::{anyhow, bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use clinic_agenda::constants::DEFAULT_DURATION_MINUTES;
use clinic_agenda::models::parse_date;
use clinic_agenda::occupancy::{occupants, SlotFilter};
use clinic_agenda::render;
use clinic_agenda::seed;
use clinic_agenda::waiting_list::{announcement, NewWaitingEntry, WaitingListFilter};
use clinic_agenda::{
    AgendaConfig, AgendaError, AgendaPage, AppointmentQuery, AppointmentStatus, AppointmentType,
    ClockTime, Direction, Event, Outcome, PageMode, ViewMode, WaitingPriority,
};
use std::io::{self, Write};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clinic-agenda")]
#[command(about = "Clinic appointment agenda")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the calendar grid
    Calendar {
        /// day, week or month
        #[arg(long)]
        view: Option<String>,
        /// Pivot date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        professional: Option<String>,
    },
    /// List the appointments starting in one calendar cell
    Slot {
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Time (HH:MM)
        #[arg(long)]
        time: String,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        professional: Option<String>,
    },
    /// Book an appointment through the editor
    Book {
        #[arg(long)]
        patient: String,
        #[arg(long)]
        professional: String,
        #[arg(long)]
        unit: String,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Time (HH:MM)
        #[arg(long)]
        time: String,
        #[arg(long, default_value_t = DEFAULT_DURATION_MINUTES)]
        duration: u32,
        /// consultation, exam, follow-up or emergency
        #[arg(long = "type", default_value = "consultation")]
        kind: String,
        #[arg(long)]
        observations: Option<String>,
    },
    /// List the waiting list
    WaitingList {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        professional: Option<String>,
        /// high, medium or low
        #[arg(long)]
        priority: Option<String>,
    },
    /// List appointments
    Appointments {
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        professional: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// First date (YYYY-MM-DD), inclusive
        #[arg(long)]
        from: Option<String>,
        /// Last date (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the menu-driven agenda
    Interactive,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_agenda=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = AgendaConfig::from_env_values(|key| std::env::var(key).ok())
        .context("failed to load agenda configuration")?;
    let now = Local::now();
    let mut page = AgendaPage::new(seed::clinic_store(now), config, now.date_naive());

    match cli.command {
        Some(Commands::Calendar {
            view,
            date,
            unit,
            professional,
        }) => {
            if let Some(view) = view {
                page.handle(Event::SetViewMode(ViewMode::from_string(&view)?), now)?;
            }
            if let Some(date) = date {
                page.handle(Event::GoTo(parse_date(&date)?), now)?;
            }
            page.handle(Event::SetUnitFilter(unit), now)?;
            page.handle(Event::SetProfessionalFilter(professional), now)?;
            print!("{}", render::page(&page, now.date_naive()));
        }
        Some(Commands::Slot {
            date,
            time,
            unit,
            professional,
        }) => {
            let date = parse_date(&date)?;
            let time: ClockTime = time.parse()?;
            let filter = SlotFilter {
                unit_id: unit,
                professional_id: professional,
            };
            let found = occupants(page.store().appointments(), date, time, &filter);
            if found.is_empty() {
                println!("No appointments start at {} {}.", date.format("%d/%m/%Y"), time);
            }
            for appointment in found {
                println!("{}", render::appointment_line(appointment, page.store()));
            }
        }
        Some(Commands::Book {
            patient,
            unit,
            professional,
            date,
            time,
            duration,
            kind,
            observations,
        }) => {
            page.handle(Event::GoTo(parse_date(&date)?), now)?;
            page.handle(Event::NewAppointment, now)?;
            if let Some(editor) = page.editor_mut() {
                editor.select_patient(patient);
                editor.select_unit(unit);
                editor.select_professional(professional);
                editor.set_start_time(time);
                editor.set_duration(duration);
                editor.set_kind(AppointmentType::from_string(&kind)?);
                editor.set_observations(observations.unwrap_or_default());
            }
            match page.handle(Event::Submit, now)? {
                Outcome::Saved { id, .. } => {
                    print_notices(&mut page);
                    if let Some(appointment) = page.store().appointment(&id) {
                        println!("{}", render::appointment_line(appointment, page.store()));
                    }
                }
                Outcome::Invalid(errors) => {
                    for error in errors.iter() {
                        eprintln!("  {}: {}", error.field.name(), error.message);
                    }
                    return Err(AgendaError::from(errors)).context("appointment not saved");
                }
                other => bail!("unexpected outcome: {:?}", other),
            }
        }
        Some(Commands::WaitingList {
            search,
            professional,
            priority,
        }) => {
            let filter = WaitingListFilter {
                search: search.unwrap_or_default(),
                professional_id: professional,
                priority: priority
                    .as_deref()
                    .map(WaitingPriority::from_string)
                    .transpose()?,
            };
            page.handle(Event::OpenWaitingList, now)?;
            page.handle(Event::SetWaitingFilter(filter), now)?;
            print!("{}", render::page(&page, now.date_naive()));
        }
        Some(Commands::Appointments {
            unit,
            professional,
            status,
            from,
            to,
            json,
        }) => {
            let mut query = AppointmentQuery::new();
            query.unit_id = unit;
            query.professional_id = professional;
            if let Some(status) = status {
                query = query.status(AppointmentStatus::from_string(&status)?);
            }
            match (from, to) {
                (Some(from), Some(to)) => query = query.between(parse_date(&from)?, parse_date(&to)?),
                (Some(from), None) => query = query.between(parse_date(&from)?, NaiveDate::MAX),
                (None, Some(to)) => query = query.between(NaiveDate::MIN, parse_date(&to)?),
                (None, None) => {}
            }

            let found = page.store().query(&query);
            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else if found.is_empty() {
                println!("No appointments found.");
            } else {
                for appointment in found {
                    println!("{}", render::appointment_line(appointment, page.store()));
                }
            }
        }
        Some(Commands::Interactive) | None => {
            let mut cli = AgendaCli::new(page);
            cli.run()?;
        }
    }

    Ok(())
}

fn print_notices(page: &mut AgendaPage) {
    for notice in page.take_notices() {
        println!("[{}] {}", notice.title, notice.description);
    }
}

/// Menu loop over an `AgendaPage`.
struct AgendaCli {
    page: AgendaPage,
    running: bool,
}

impl AgendaCli {
    fn new(page: AgendaPage) -> Self {
        AgendaCli {
            page,
            running: true,
        }
    }

    fn get_input(&self, prompt: &str, default: Option<&str>) -> anyhow::Result<String> {
        if let Some(def) = default {
            print!("{} [{}]: ", prompt, def);
        } else {
            print!("{}: ", prompt);
        }
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "standard input closed").into());
        }
        let input = input.trim();

        if input.is_empty() {
            Ok(default.unwrap_or("").to_string())
        } else {
            Ok(input.to_string())
        }
    }

    fn get_optional(&self, prompt: &str) -> anyhow::Result<Option<String>> {
        let value = self.get_input(prompt, None)?;
        Ok(Some(value).filter(|v| !v.is_empty()))
    }

    fn send(&mut self, event: Event) -> anyhow::Result<Outcome> {
        Ok(self.page.handle(event, Local::now())?)
    }

    fn print_menu(&self) {
        match self.page.mode() {
            PageMode::Calendar => {
                println!("\n--- Calendar ---");
                println!("c today | n/p next/prev | d/w/m view | g go to date");
                println!("u unit filter | r professional filter | s open slot | o open appointment");
                println!("b new appointment | l waiting list | q quit");
            }
            PageMode::WaitingList => {
                println!("\n--- Waiting list ---");
                println!("f announce | s search | x call | r remove | a add | k calendar | q quit");
            }
            PageMode::Form => {}
        }
    }

    fn show(&mut self) -> anyhow::Result<()> {
        let now = Local::now();
        self.send(Event::Tick)?;
        print_notices(&mut self.page);
        println!("\n{}", "=".repeat(60));
        print!("{}", render::page(&self.page, now.date_naive()));
        Ok(())
    }

    fn calendar_command(&mut self, command: &str) -> anyhow::Result<()> {
        match command {
            "c" | "C" => {
                self.send(Event::Key('c'))?;
            }
            "n" => {
                self.send(Event::Navigate(Direction::Next))?;
            }
            "p" => {
                self.send(Event::Navigate(Direction::Prev))?;
            }
            "d" => {
                self.send(Event::SetViewMode(ViewMode::Day))?;
            }
            "w" => {
                self.send(Event::SetViewMode(ViewMode::Week))?;
            }
            "m" => {
                self.send(Event::SetViewMode(ViewMode::Month))?;
            }
            "g" => {
                let date = parse_date(&self.get_input("Date (YYYY-MM-DD)", None)?)?;
                let event = match self.page.view_mode() {
                    ViewMode::Month => Event::ClickDay(date),
                    ViewMode::Day | ViewMode::Week => Event::GoTo(date),
                };
                self.send(event)?;
            }
            "u" => {
                for unit in self.page.store().units() {
                    println!("  {}. {}", unit.id, unit.name);
                }
                let unit = self.get_optional("Unit id (empty for all)")?;
                self.send(Event::SetUnitFilter(unit))?;
            }
            "r" => {
                for professional in self.page.professional_filter_options() {
                    println!("  {}. {} - {}", professional.id, professional.name, professional.specialty);
                }
                let professional = self.get_optional("Professional id (empty for all)")?;
                self.send(Event::SetProfessionalFilter(professional))?;
            }
            "s" => {
                let today = Local::now().date_naive().to_string();
                let date = parse_date(&self.get_input("Date (YYYY-MM-DD)", Some(&today))?)?;
                let time: ClockTime = self.get_input("Time (HH:MM)", None)?.parse()?;
                if self.send(Event::ClickSlot { date, time })? == Outcome::Ignored {
                    println!("Slots can only be opened from the day or week view");
                }
            }
            "o" => {
                let id = self.get_input("Appointment id", None)?;
                self.send(Event::ClickAppointment(id))?;
            }
            "b" => {
                self.send(Event::NewAppointment)?;
            }
            "l" => {
                self.send(Event::OpenWaitingList)?;
            }
            _ => println!("Invalid choice"),
        }
        Ok(())
    }

    fn fill_form(&mut self) -> anyhow::Result<()> {
        let store = self.page.store();
        let editor = self.page.editor().ok_or_else(|| anyhow!("no form open"))?;

        let search = self.get_input("Search patient (name or CPF)", None)?;
        for patient in store.search_patients(&search) {
            println!("  {}. {} ({})", patient.id, patient.name, patient.cpf);
        }
        let patient = self.get_input("Patient id", Some(editor.patient_id()))?;

        for unit in store.units() {
            println!("  {}. {}", unit.id, unit.name);
        }
        let unit = self.get_input("Unit id", Some(editor.unit_id()))?;

        for professional in store.professionals_in_unit(Some(&unit)) {
            println!("  {}. {} - {}", professional.id, professional.name, professional.specialty);
        }
        let professional = self.get_input("Professional id", Some(editor.professional_id()))?;

        let current_date = editor.date().map(|d| d.to_string()).unwrap_or_default();
        let date = self.get_input("Date (YYYY-MM-DD)", Some(&current_date))?;
        let time = self.get_input("Time (HH:MM)", Some(editor.start_time()))?;
        let duration = self.get_input("Duration (minutes)", Some(&editor.duration().to_string()))?;
        let kind = self.get_input("Type", Some(editor.kind().code()))?;
        let observations = self.get_input("Observations", None)?;

        let date = match date.as_str() {
            "" => None,
            raw => Some(parse_date(raw)?),
        };
        let duration: u32 = duration.parse().context("duration must be a number")?;
        let kind = AppointmentType::from_string(&kind)?;

        if let Some(editor) = self.page.editor_mut() {
            editor.select_unit(unit);
            editor.select_patient(patient);
            editor.select_professional(professional);
            editor.set_date(date);
            editor.set_start_time(time);
            editor.set_duration(duration);
            editor.set_kind(kind);
            if !observations.is_empty() {
                editor.set_observations(observations);
            }
        }
        Ok(())
    }

    fn form_step(&mut self) -> anyhow::Result<()> {
        if let Err(e) = self.fill_form() {
            println!("Error: {}", e);
        }

        match self.send(Event::Submit)? {
            Outcome::Saved { .. } => {}
            Outcome::Invalid(errors) => {
                println!("\nPlease fix the following:");
                for error in errors.iter() {
                    println!("  - {}: {}", error.field.name(), error.message);
                }
                let again = self.get_input("Edit again? (y/n)", Some("y"))?;
                if again.to_lowercase() != "y" {
                    self.send(Event::Cancel)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn waiting_command(&mut self, command: &str) -> anyhow::Result<()> {
        match command {
            "f" | "F" => {
                if let Outcome::Announcement(text) = self.send(Event::Key('f'))? {
                    println!("{}", text);
                }
            }
            "s" => {
                let search = self.get_input("Search (name or phone)", None)?;
                let priority = self
                    .get_optional("Priority (high/medium/low, empty for all)")?
                    .map(|p| WaitingPriority::from_string(&p))
                    .transpose()?;
                self.send(Event::SetWaitingFilter(WaitingListFilter {
                    search,
                    priority,
                    ..WaitingListFilter::default()
                }))?;
            }
            "x" => {
                let id = self.get_input("Entry id", None)?;
                self.send(Event::CallPatient(id))?;
            }
            "r" => {
                let id = self.get_input("Entry id", None)?;
                if let Outcome::ConfirmationRequired(question) = self.send(Event::RequestRemoval(id))? {
                    let answer = self.get_input(&format!("{} (y/n)", question), Some("n"))?;
                    let event = match answer.to_lowercase().as_str() {
                        "y" => Event::ConfirmRemoval,
                        _ => Event::DeclineRemoval,
                    };
                    self.send(event)?;
                }
            }
            "a" => self.add_waiting_entry()?,
            "k" => {
                self.send(Event::ShowCalendar)?;
            }
            _ => println!("Invalid choice"),
        }
        Ok(())
    }

    fn add_waiting_entry(&mut self) -> anyhow::Result<()> {
        let search = self.get_input("Search patient (name or CPF)", None)?;
        for patient in self.page.store().search_patients(&search) {
            println!("  {}. {} ({})", patient.id, patient.name, patient.phone);
        }
        let patient_id = self.get_input("Patient id", None)?;
        let (patient_name, patient_phone) = self
            .page
            .store()
            .patient(&patient_id)
            .map(|p| (p.name.clone(), p.phone.clone()))
            .unwrap_or_default();

        let professional_id = self.get_input("Professional id", None)?;
        let dates = self.get_input("Preferred dates (YYYY-MM-DD, comma-separated)", None)?;
        let times = self.get_input("Preferred times (HH:MM, comma-separated)", None)?;
        let kind = self.get_input("Type", Some("consultation"))?;
        let priority = self.get_input("Priority", Some("medium"))?;

        let preferred_dates = split_list(&dates)
            .map(parse_date)
            .collect::<Result<Vec<_>, _>>()?;
        let preferred_times = split_list(&times)
            .map(str::parse::<ClockTime>)
            .collect::<Result<Vec<_>, _>>()?;

        let request = NewWaitingEntry {
            patient_id,
            patient_name,
            patient_phone,
            professional_id,
            preferred_dates,
            preferred_times,
            kind: AppointmentType::from_string(&kind)?,
            priority: WaitingPriority::from_string(&priority)?,
        };
        if let Outcome::Invalid(errors) = self.send(Event::AddToWaitingList(request))? {
            for error in errors.iter() {
                println!("  - {}: {}", error.field.name(), error.message);
            }
        }
        Ok(())
    }

    fn step(&mut self) -> anyhow::Result<()> {
        self.show()?;

        if self.page.mode() == PageMode::Form {
            return self.form_step();
        }

        self.print_menu();
        let choice = self.get_input("Enter choice", None)?;
        match (self.page.mode(), choice.as_str()) {
            (_, "q") => {
                self.running = false;
                println!("\nGoodbye!");
            }
            (PageMode::WaitingList, command) => self.waiting_command(command)?,
            (_, command) => self.calendar_command(command)?,
        }
        Ok(())
    }

    fn run(&mut self) -> anyhow::Result<()> {
        println!("\n{}", "=".repeat(60));
        println!("       CLINIC AGENDA");
        let waiting = self.page.store().waiting_list().len();
        println!("       {}", announcement(waiting));
        info!("interactive agenda started");

        while self.running {
            if let Err(e) = self.step() {
                let closed = e
                    .downcast_ref::<io::Error>()
                    .map_or(false, |err| err.kind() == io::ErrorKind::UnexpectedEof);
                if closed {
                    break;
                }
                println!("Error: {}", e);
            }
        }
        Ok(())
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}
