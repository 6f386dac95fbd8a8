use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use maintenance_domain::{Equipment, MaintenancePlan, PlanRepository, RecurrenceUnit};
use maintenance_persistence::{DieselPlanRepository, DieselRequestStore};
use mockable::DefaultClock;
use plan_scheduler::{GenerationOutcome, SchedulerConfig, SchedulerService};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

type Service = SchedulerService<DieselRequestStore, DieselPlanRepository>;

/// Generador de solicitudes de mantenimiento preventivo.
///
/// Sin subcomando ejecuta la pasada periódica (pensado para cron).
#[derive(Parser)]
#[command(name = "maintenance-cron", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Genera solicitudes para todos los planes e imprime el informe en JSON
    Run,
    /// Disparador manual para un plan
    Generate { plan_id: Uuid },
    /// Muestra la próxima fecha de mantenimiento de un plan
    Next { plan_id: Uuid },
    /// Menú interactivo
    Menu,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
                             .with_target(false)
                             .init();

    let cli = Cli::parse();
    let db = maintenance_persistence::new_from_env().context("no se pudo abrir la base de datos")?;
    let config = SchedulerConfig::from_env().context("configuración inválida")?;
    info!("política de horizonte: {:?}", config.horizon_policy);
    let plans = Arc::new(db.plans());
    let service = SchedulerService::new(plans.clone(), Arc::new(db.requests()), Arc::new(DefaultClock), config);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&service),
        Command::Generate { plan_id } => {
            print_outcome(&plan_id, service.generate_for_plan(&plan_id)?);
            Ok(())
        }
        Command::Next { plan_id } => {
            match service.next_maintenance_date(&plan_id)? {
                Some(date) => println!("{}", date),
                None => println!("-"),
            }
            Ok(())
        }
        Command::Menu => menu(&service, plans.as_ref()),
    }
}

fn run(service: &Service) -> anyhow::Result<()> {
    let report = service.run_periodic()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.failures.is_empty() {
        bail!("{} planes fallaron", report.failures.len());
    }
    Ok(())
}

fn print_outcome(plan_id: &Uuid, outcome: GenerationOutcome) {
    match outcome {
        GenerationOutcome::Generated(reqs) if reqs.is_empty() => println!("Plan {}: nada que generar", plan_id),
        GenerationOutcome::Generated(reqs) => {
            println!("Plan {}: {} solicitudes creadas", plan_id, reqs.len());
            for r in reqs {
                println!("  {}", r);
            }
        }
        GenerationOutcome::Skipped(reason) => println!("Plan {} omitido: {:?}", plan_id, reason),
    }
}

/// Menú interactivo sobre la base de datos configurada.
///
/// Opciones soportadas:
/// 1) Ver planes
/// 2) Crear equipo y plan
/// 3) Generar solicitudes (todos los planes)
/// 4) Generar solicitudes de un plan
/// 5) Ver solicitudes de un plan
/// 6) Completar solicitud
/// 7) Reprogramar solicitud
/// 8) Fijar próxima fecha de un plan
/// 9) Salir
fn menu(service: &Service, plans: &DieselPlanRepository) -> anyhow::Result<()> {
    loop {
        println!("\n== Maintenance menu ==");
        println!("1) Ver planes");
        println!("2) Crear equipo y plan");
        println!("3) Generar solicitudes (todos los planes)");
        println!("4) Generar solicitudes de un plan");
        println!("5) Ver solicitudes de un plan");
        println!("6) Completar solicitud");
        println!("7) Reprogramar solicitud");
        println!("8) Fijar próxima fecha de un plan");
        println!("9) Salir");
        let choice = prompt("Elige una opción: ")?;
        match choice.trim() {
            "1" => {
                let ids = match plans.list_plan_ids() {
                    Ok(ids) => ids,
                    Err(e) => { eprintln!("Error listando planes: {}", e); continue; }
                };
                println!("\nID                                   | PRÓXIMA    | NOMBRE");
                println!("-----------------------------------------------------------------------------------");
                for id in ids {
                    let name = service.plan_display_name(&id).unwrap_or_else(|e| format!("<error: {}>", e));
                    let next = match service.next_maintenance_date(&id) {
                        Ok(Some(d)) => d.to_string(),
                        Ok(None) => "-".into(),
                        Err(_) => "error".into(),
                    };
                    println!("{} | {:<10} | {}", id, next, name);
                }
            }
            "2" => {
                let eq_name = prompt("Nombre del equipo: ")?;
                let start_s = prompt("Fecha de inicio (YYYY-MM-DD, enter para ninguna): ")?;
                let start = if start_s.trim().is_empty() {
                    None
                } else {
                    match NaiveDate::parse_from_str(start_s.trim(), "%Y-%m-%d") {
                        Ok(d) => Some(d),
                        Err(_) => { eprintln!("Fecha inválida"); continue; }
                    }
                };
                let qty: i64 = match prompt("Cada cuántas unidades (entero): ")?.trim().parse() {
                    Ok(n) => n,
                    Err(_) => { eprintln!("Cantidad inválida"); continue; }
                };
                let unit: RecurrenceUnit = match prompt("Unidad (day/week/month/year): ")?.trim().parse() {
                    Ok(u) => u,
                    Err(e) => { eprintln!("{}", e); continue; }
                };
                let horizon: u32 = match prompt("Horizonte (número de solicitudes): ")?.trim().parse() {
                    Ok(n) => n,
                    Err(_) => { eprintln!("Horizonte inválido"); continue; }
                };
                let plan_name = prompt("Nombre del plan (enter para vacío): ")?;
                let eq_id = match plans.save_equipment(Equipment::new(eq_name.trim())) {
                    Ok(id) => id,
                    Err(e) => { eprintln!("Error creando equipo: {}", e); continue; }
                };
                let mut plan = MaintenancePlan::new(eq_id, start, qty, unit, horizon);
                if !plan_name.trim().is_empty() {
                    plan = plan.with_name(plan_name.trim());
                }
                match plans.save_plan(plan) {
                    Ok(id) => println!("Plan creado: {}", id),
                    Err(e) => eprintln!("Error creando plan: {}", e),
                }
            }
            "3" => match service.run_periodic() {
                Ok(report) => {
                    println!("{} creadas, {} omitidos, {} fallidos",
                             report.created.len(),
                             report.skipped.len(),
                             report.failures.len());
                    for f in report.failures {
                        println!("  plan {}: {}", f.plan_id, f.error);
                    }
                }
                Err(e) => eprintln!("Error en la generación: {}", e),
            },
            "4" => {
                let Some(id) = prompt_uuid("Plan id (UUID): ")? else { continue };
                match service.generate_for_plan(&id) {
                    Ok(outcome) => print_outcome(&id, outcome),
                    Err(e) => eprintln!("Error generando: {}", e),
                }
            }
            "5" => {
                let Some(id) = prompt_uuid("Plan id (UUID): ")? else { continue };
                match service.requests_for_plan(&id) {
                    Ok(reqs) => {
                        for r in reqs {
                            println!("{} | {}", r.id, r);
                        }
                    }
                    Err(e) => eprintln!("Error listando solicitudes: {}", e),
                }
            }
            "6" => {
                let Some(id) = prompt_uuid("Solicitud id (UUID): ")? else { continue };
                match service.complete_request(&id) {
                    Ok(r) => println!("Completada: {}", r),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            "7" => {
                let Some(id) = prompt_uuid("Solicitud id (UUID): ")? else { continue };
                let date = match NaiveDate::parse_from_str(prompt("Nueva fecha (YYYY-MM-DD): ")?.trim(), "%Y-%m-%d") {
                    Ok(d) => d,
                    Err(_) => { eprintln!("Fecha inválida"); continue; }
                };
                match service.reschedule_request(&id, date) {
                    Ok(r) => println!("Reprogramada: {}", r),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            "8" => {
                let Some(id) = prompt_uuid("Plan id (UUID): ")? else { continue };
                let date_s = prompt("Próxima fecha (YYYY-MM-DD, enter para volver a la calculada): ")?;
                let date = if date_s.trim().is_empty() {
                    None
                } else {
                    match NaiveDate::parse_from_str(date_s.trim(), "%Y-%m-%d") {
                        Ok(d) => Some(d),
                        Err(_) => { eprintln!("Fecha inválida"); continue; }
                    }
                };
                match service.set_next_maintenance_date(&id, date) {
                    Ok(plan) => println!("Plan actualizado: {}", plan),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            "9" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}

fn prompt_uuid(msg: &str) -> io::Result<Option<Uuid>> {
    let s = prompt(msg)?;
    match Uuid::parse_str(s.trim()) {
        Ok(u) => Ok(Some(u)),
        Err(_) => {
            eprintln!("UUID inválido");
            Ok(None)
        }
    }
}
