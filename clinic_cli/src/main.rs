use clap::{Parser, Subcommand};
use clinic_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic scheduling client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    server: Option<String>,

    /// Skip confirmation prompts on destructive commands
    #[arg(long, global = true)]
    yes: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Discard the stored session
    Logout,

    /// Manage doctors
    Doctors {
        #[command(subcommand)]
        command: DoctorCommands,
    },

    /// Manage patients
    Patients {
        #[command(subcommand)]
        command: PatientCommands,
    },

    /// Manage schedules
    Schedules {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
}

#[derive(Subcommand)]
enum DoctorCommands {
    /// List all doctors
    List,
    /// Add a doctor
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        specialty: String,
        #[arg(long)]
        crm: String,
        #[arg(long)]
        phone: String,
    },
    /// Delete a doctor by id
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum PatientCommands {
    /// List patients, optionally filtered by name, email or phone
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a patient
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        age: u32,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        medical_history: Option<String>,
    },
    /// Delete a patient by id
    Remove { id: i64 },
}

#[derive(Subcommand)]
enum ScheduleCommands {
    /// Show today's appointments, optionally filtered
    Today {
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a schedule
    Add {
        #[arg(long)]
        doctor_id: i64,
        #[arg(long)]
        patient_id: i64,
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Time as HH:MM
        #[arg(long)]
        time: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = NewSchedule::DEFAULT_STATUS)]
        status: String,
    },
    /// Delete a schedule by id
    Remove { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    clinic_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let base_url = cli
        .server
        .unwrap_or_else(|| config.server.base_url.clone());
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());

    let session = Arc::new(SessionStore::load(data_dir.join("session.json")));
    let guard = RouteGuard::new(Arc::clone(&session));
    let client = Arc::new(ApiClient::new(base_url, Arc::clone(&session)));

    match cli.command {
        Commands::Login { email, password } => {
            cmd_login(&client, &guard, email, password).await
        }
        Commands::Register {
            name,
            email,
            password,
        } => cmd_register(&client, &guard, name, email, password).await,
        Commands::Logout => {
            guard.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Doctors { command } => cmd_doctors(&client, &guard, command, cli.yes).await,
        Commands::Patients { command } => cmd_patients(&client, &guard, command, cli.yes).await,
        Commands::Schedules { command } => cmd_schedules(&client, &guard, command, cli.yes).await,
    }
}

async fn cmd_login(
    client: &Arc<ApiClient>,
    guard: &RouteGuard,
    email: String,
    password: String,
) -> Result<()> {
    let auth = AuthFlow::new(Arc::clone(client), guard.clone());
    match auth.login(&Credentials { email, password }).await? {
        LoginOutcome::LoggedIn => println!("Login successful"),
        LoginOutcome::Rejected(message) => eprintln!("✗ {}", message),
    }
    Ok(())
}

async fn cmd_register(
    client: &Arc<ApiClient>,
    guard: &RouteGuard,
    name: String,
    email: String,
    password: String,
) -> Result<()> {
    let auth = AuthFlow::new(Arc::clone(client), guard.clone());
    match auth
        .register(&Registration {
            name,
            email,
            password,
        })
        .await
    {
        RegisterOutcome::Registered => {
            println!("Account created. Log in with `clinic login`.");
        }
        RegisterOutcome::Rejected(message) => eprintln!("✗ {}", message),
    }
    Ok(())
}

async fn cmd_doctors(
    client: &Arc<ApiClient>,
    guard: &RouteGuard,
    command: DoctorCommands,
    assume_yes: bool,
) -> Result<()> {
    if redirected(guard, Route::Doctors) {
        return Ok(());
    }
    let mut doctors: ListController<Doctor> =
        ListController::new(Arc::clone(client), guard.clone());

    match command {
        DoctorCommands::List => {
            let flow = doctors.load().await;
            if report(&mut doctors, flow) {
                for doctor in doctors.items() {
                    println!(
                        "{:>4}  {} - {} ({}, {})",
                        doctor.id, doctor.name, doctor.specialty, doctor.email, doctor.phone
                    );
                }
            }
        }
        DoctorCommands::Add {
            name,
            email,
            specialty,
            crm,
            phone,
        } => {
            let flow = doctors
                .create(&NewDoctor {
                    name,
                    email,
                    specialty,
                    crm,
                    phone,
                })
                .await;
            report(&mut doctors, flow);
        }
        DoctorCommands::Remove { id } => {
            let confirmed = confirm("Are you sure you want to delete this doctor?", assume_yes)?;
            let flow = doctors.remove(id, confirmed).await;
            report(&mut doctors, flow);
        }
    }
    Ok(())
}

async fn cmd_patients(
    client: &Arc<ApiClient>,
    guard: &RouteGuard,
    command: PatientCommands,
    assume_yes: bool,
) -> Result<()> {
    if redirected(guard, Route::Patients) {
        return Ok(());
    }
    let mut patients: ListController<Patient> =
        ListController::new(Arc::clone(client), guard.clone());

    match command {
        PatientCommands::List { search } => {
            let flow = patients.load().await;
            if report(&mut patients, flow) {
                let term = search.unwrap_or_default();
                for patient in patients.filter(&term) {
                    println!(
                        "{:>4}  {} ({}, {}) - age {}, {}",
                        patient.id,
                        patient.name,
                        patient.email,
                        patient.phone,
                        patient.age,
                        patient.address
                    );
                    if let Some(ref history) = patient.medical_history {
                        println!("      {}", history);
                    }
                }
            }
        }
        PatientCommands::Add {
            name,
            email,
            age,
            phone,
            address,
            medical_history,
        } => {
            let flow = patients
                .create(&NewPatient {
                    name,
                    email,
                    age,
                    phone,
                    address,
                    medical_history,
                })
                .await;
            report(&mut patients, flow);
        }
        PatientCommands::Remove { id } => {
            let confirmed =
                confirm("Are you sure you want to delete this patient?", assume_yes)?;
            let flow = patients.remove(id, confirmed).await;
            report(&mut patients, flow);
        }
    }
    Ok(())
}

async fn cmd_schedules(
    client: &Arc<ApiClient>,
    guard: &RouteGuard,
    command: ScheduleCommands,
    assume_yes: bool,
) -> Result<()> {
    let route = match command {
        ScheduleCommands::Today { .. } => Route::Dashboard,
        _ => Route::Schedules,
    };
    if redirected(guard, route) {
        return Ok(());
    }
    let mut schedules: ListController<Schedule> =
        ListController::new(Arc::clone(client), guard.clone());

    match command {
        ScheduleCommands::Today { search } => {
            let flow = schedules.load().await;
            if report(&mut schedules, flow) {
                let term = search.unwrap_or_default();
                let todays = schedules.filter(&term);
                if todays.is_empty() {
                    println!("No appointments scheduled for today.");
                }
                for appointment in todays {
                    print_appointment(appointment);
                }
            }
        }
        ScheduleCommands::Add {
            doctor_id,
            patient_id,
            date,
            time,
            description,
            status,
        } => {
            let date = chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .map_err(|e| Error::Other(format!("Invalid date '{}': {}", date, e)))?;
            let time = chrono::NaiveTime::parse_from_str(&time, "%H:%M")
                .map_err(|e| Error::Other(format!("Invalid time '{}': {}", time, e)))?;

            let flow = schedules
                .create(&NewSchedule {
                    doctor_id,
                    patient_id,
                    date: date.format("%Y-%m-%d").to_string(),
                    time: time.format("%H:%M").to_string(),
                    description,
                    status,
                })
                .await;
            report(&mut schedules, flow);
        }
        ScheduleCommands::Remove { id } => {
            let confirmed =
                confirm("Are you sure you want to delete this schedule?", assume_yes)?;
            let flow = schedules.remove(id, confirmed).await;
            report(&mut schedules, flow);
        }
    }
    Ok(())
}

/// Route-guard check before any protected command touches the network.
fn redirected(guard: &RouteGuard, route: Route) -> bool {
    if guard.resolve(route) == Route::Login {
        println!("Not logged in. Run `clinic login` first.");
        true
    } else {
        false
    }
}

/// Print the controller's pending notice and handle forced navigation.
/// Returns false when the session was torn down.
fn report<R: Resource>(controller: &mut ListController<R>, flow: Flow) -> bool {
    if flow == Flow::RedirectToLogin {
        println!("Session expired. Please log in again.");
        return false;
    }
    if let Some(notice) = controller.take_notice() {
        match notice.severity {
            Severity::Success => println!("✓ {}", notice.message),
            Severity::Error => eprintln!("✗ {}", notice.message),
        }
    }
    true
}

fn print_appointment(appointment: &Schedule) {
    let patient = appointment
        .patient
        .as_ref()
        .map(|p| p.name.as_str())
        .unwrap_or("-");
    let doctor = appointment
        .doctor
        .as_ref()
        .map(|d| d.name.as_str())
        .unwrap_or("-");
    let time = appointment.time.as_deref().unwrap_or("--:--");

    println!("{:>4}  {}  {} with {}", appointment.id, time, patient, doctor);
    if let Some(ref description) = appointment.description {
        if !description.is_empty() {
            println!("      {}", description);
        }
    }
}

fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
