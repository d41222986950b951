use anyhow::bail;
use clap::{Parser, Subcommand};
use clinic_core::{
    open_store, AppointmentService, ClinicService, ConfirmOutcome, CoreConfig, DoctorService,
    RejectOutcome, RequestOutcome, User, UserService, UserUpdate,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic appointment ledger CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Request an appointment slot with a doctor
    Request {
        doctor_id: String,
        /// Appointment date, e.g. 2024-06-01
        date: String,
        /// Appointment time, e.g. 10:00
        time: String,
        user_id: String,
    },
    /// Confirm a pending request
    Confirm { doctor_id: String, request_id: String },
    /// Reject a pending request
    Reject { doctor_id: String, request_id: String },
    /// Show a doctor's pending requests and confirmed appointments
    Ledger { doctor_id: String },
    /// List all users
    ListUsers,
    /// Add a user
    AddUser {
        name: String,
        login: String,
        /// Date of birth (YYYY-MM-DD)
        birth: String,
    },
    /// Update a user's details
    UpdateUser {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        login: Option<String>,
        #[arg(long)]
        birth: Option<String>,
    },
    /// Delete a user
    DeleteUser { id: String },
    /// Register a user with a doctor
    LinkDoctor { user_id: String, doctor_id: String },
    /// List all doctors
    ListDoctors,
    /// Add a doctor (creates an empty ledger)
    AddDoctor {
        name: String,
        speciality: String,
        /// Clinic the doctor works at (optional)
        #[arg(long)]
        clinic: Option<String>,
    },
    /// List all clinics
    ListClinics,
    /// Add a clinic
    AddClinic { name: String, address: String },
}

fn print_user(user: &User) {
    let doctors: Vec<String> = user.doctor_ids.iter().map(|id| id.to_string()).collect();
    println!(
        "ID: {}, Name: {}, Login: {}, Birth: {}, Doctors: [{}], Created: {}",
        user.id,
        user.name,
        user.login,
        user.birth,
        doctors.join(", "),
        user.created_at
    );
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'clinic --help' for commands");
        return Ok(());
    };

    let cfg = CoreConfig::from_env_values(
        std::env::var("CLINIC_DATA_DIR").ok(),
        std::env::var("CLINIC_STORE").ok(),
    )?;
    let store = open_store(&cfg)?;

    match command {
        Commands::Request {
            doctor_id,
            date,
            time,
            user_id,
        } => {
            let service = AppointmentService::new(store);
            match service.submit_request(&doctor_id, &date, &time, &user_id)? {
                RequestOutcome::Accepted(request_id) => println!("Request ID: {}", request_id),
                RequestOutcome::Rejected(reason) => bail!("request rejected: {}", reason),
            }
        }
        Commands::Confirm {
            doctor_id,
            request_id,
        } => {
            let service = AppointmentService::new(store);
            match service.confirm(&doctor_id, &request_id)? {
                ConfirmOutcome::Confirmed(confirmation) => println!(
                    "Confirmed {} on {} at {} for user {}",
                    confirmation.confirmation_id,
                    confirmation.date,
                    confirmation.time,
                    confirmation.user_id
                ),
                ConfirmOutcome::NotFound => bail!("no pending request {}", request_id),
            }
        }
        Commands::Reject {
            doctor_id,
            request_id,
        } => {
            let service = AppointmentService::new(store);
            match service.reject(&doctor_id, &request_id)? {
                RejectOutcome::Rejected(request) => println!(
                    "Rejected {} on {} at {} for user {}",
                    request.request_id, request.date, request.time, request.user_id
                ),
                RejectOutcome::NotFound => bail!("no pending request {}", request_id),
            }
        }
        Commands::Ledger { doctor_id } => {
            let ledger = AppointmentService::new(store).ledger(&doctor_id)?;
            if ledger.is_empty() {
                println!("No appointments for doctor {}.", doctor_id);
            }
            for request in ledger.requests() {
                println!(
                    "PENDING   {} {} {} user {}",
                    request.request_id, request.date, request.time, request.user_id
                );
            }
            for confirmation in ledger.confirms() {
                println!(
                    "CONFIRMED {} {} {} user {}",
                    confirmation.confirmation_id,
                    confirmation.date,
                    confirmation.time,
                    confirmation.user_id
                );
            }
        }
        Commands::ListUsers => {
            let users = UserService::new(store).list_users()?;
            if users.is_empty() {
                println!("No users found.");
            }
            users.iter().for_each(print_user);
        }
        Commands::AddUser { name, login, birth } => {
            let user = UserService::new(store).add_user(&name, &login, &birth)?;
            println!("Added user with ID: {}", user.id);
        }
        Commands::UpdateUser {
            id,
            name,
            login,
            birth,
        } => {
            let update = UserUpdate { name, login, birth };
            match UserService::new(store).update_user(&id, update)? {
                Some(user) => print_user(&user),
                None => bail!("no user {}", id),
            }
        }
        Commands::DeleteUser { id } => {
            if !UserService::new(store).delete_user(&id)? {
                bail!("no user {}", id);
            }
            println!("Deleted user {}", id);
        }
        Commands::LinkDoctor { user_id, doctor_id } => {
            match UserService::new(store).link_doctor(&user_id, &doctor_id)? {
                Some(user) => print_user(&user),
                None => bail!("no user {}", user_id),
            }
        }
        Commands::ListDoctors => {
            let doctors = DoctorService::new(store).list_doctors()?;
            if doctors.is_empty() {
                println!("No doctors found.");
            }
            for doctor in doctors {
                let clinic = doctor
                    .clinic_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "ID: {}, Name: {}, Speciality: {}, Clinic: {}, Created: {}",
                    doctor.id, doctor.name, doctor.speciality, clinic, doctor.created_at
                );
            }
        }
        Commands::AddDoctor {
            name,
            speciality,
            clinic,
        } => {
            let doctor =
                DoctorService::new(store).add_doctor(&name, &speciality, clinic.as_deref())?;
            println!("Added doctor with ID: {}", doctor.id);
        }
        Commands::ListClinics => {
            let clinics = ClinicService::new(store).list_clinics()?;
            if clinics.is_empty() {
                println!("No clinics found.");
            }
            for clinic in clinics {
                println!(
                    "ID: {}, Name: {}, Address: {}, Created: {}",
                    clinic.id, clinic.name, clinic.address, clinic.created_at
                );
            }
        }
        Commands::AddClinic { name, address } => {
            let clinic = ClinicService::new(store).add_clinic(&name, &address)?;
            println!("Added clinic with ID: {}", clinic.id);
        }
    }

    Ok(())
}
