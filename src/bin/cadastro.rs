#![cfg(feature = "cli")]

use std::path::Path;
use std::process;

use clap::{Arg, Command};

use cadastro_moradores::dashboard::Stats;
use cadastro_moradores::error::Error;
use cadastro_moradores::report::ReportView;
use cadastro_moradores::Cadastro;

#[tokio::main]
async fn main() {
    let matches = Command::new("cadastro")
        .version("0.2.0")
        .about("Municipal resident registry: list, aggregate and export records")
        .arg(
            Arg::new("list")
                .long("list")
                .help("List registered residents, newest first")
                .takes_value(false),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Print the dashboard counts")
                .takes_value(false),
        )
        .arg(
            Arg::new("export-xlsx")
                .long("export-xlsx")
                .value_name("DIR")
                .help("Export every record to a spreadsheet in DIR")
                .takes_value(true),
        )
        .arg(
            Arg::new("export-pdf")
                .long("export-pdf")
                .value_name("DIR")
                .help("Export every record to a PDF report in DIR")
                .takes_value(true),
        )
        .get_matches();

    let url = std::env::var("CADASTRO_URL")
        .unwrap_or_else(|_| "http://localhost:54321".to_string());
    let key = std::env::var("CADASTRO_KEY").unwrap_or_default();

    let cadastro = Cadastro::new(&url, &key);

    let result = run(
        &cadastro,
        matches.is_present("list"),
        matches.is_present("stats"),
        matches.value_of("export-xlsx"),
        matches.value_of("export-pdf"),
    )
    .await;

    if let Err(e) = result {
        eprintln!("erro: {}", e);
        process::exit(1);
    }
}

async fn run(
    cadastro: &Cadastro,
    list: bool,
    stats: bool,
    export_xlsx: Option<&str>,
    export_pdf: Option<&str>,
) -> Result<(), Error> {
    let store = cadastro.store();
    let view = ReportView::load(&store).await?;

    if view.mode().is_degraded() {
        eprintln!("aviso: backend indisponível, operando sobre o espelho local");
    }

    if list {
        for resident in view.records() {
            println!(
                "{}  {}  {}  {}",
                resident.id,
                resident.name,
                resident.cpf,
                resident.created_at.format("%d/%m/%Y")
            );
        }
    }

    if stats {
        let computed = Stats::compute(view.records(), chrono::Utc::now().date_naive());
        println!("Moradores Cadastrados: {}", computed.total);
        println!("Idosos: {}", computed.elderly);
        println!("Pessoas com Deficiência: {}", computed.pcd);
        println!("Cadastros Hoje: {}", computed.today);
    }

    if let Some(dir) = export_xlsx {
        let path = view.export_excel(Path::new(dir))?;
        println!("planilha gerada em {}", path.display());
    }

    if let Some(dir) = export_pdf {
        let path = view.export_pdf(Path::new(dir))?;
        println!("relatório gerado em {}", path.display());
    }

    Ok(())
}
