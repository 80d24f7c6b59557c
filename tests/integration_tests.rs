use clap::Parser;
use fleet_map::utils::validation::Validate;
use fleet_map::{CliConfig, EtlEngine, FleetError, FleetPipeline, LocalStorage, TomlConfig, Utilization};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

const DELIVERIES: &str = "\
CAMINHAO;PESO;CARGA;LATITUDE;LONGITUDE;LATITUDE CASA;LONGITUDE CASA;NOME FANTASIA;FATURAMENTO;TURNO
ABC1D23;1250,5;2000;-3.7319;-38.5267;-3.8666;-38.5773;Padaria São João;R$ 1.500,00;MANHA
ABC1D23;749,5;2000;-3.7400;-38.5300;-3.8666;-38.5773;Mercado Central;R$ 2.250,75;DIURNO
XYZ9K87;300;0;-3.7500;-38.5400;-3.8666;-38.5773;Padaria São João;R$ 100,00;
XYZ9K87;100;0;;-38.5400;-3.8666;-38.5773;Sem Coordenada;R$ 5,00;
";

fn write_input(dir: &Path, name: &str, data: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path.display().to_string()
}

fn cli_config(input: &str, output_path: &str, extra: &[&str]) -> CliConfig {
    let mut args = vec![
        "fleet-map",
        "--input",
        input,
        "--output-path",
        output_path,
        "--updated",
        "10/04/2025",
    ];
    args.extend_from_slice(extra);
    CliConfig::try_parse_from(args).unwrap()
}

#[test]
fn test_end_to_end_writes_every_format() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("out").display().to_string();
    let input = write_input(temp_dir.path(), "entregas.csv", DELIVERIES.as_bytes());

    let config = cli_config(&input, &output_path, &["--formats", "html,json,csv"]);
    assert!(config.validate().is_ok());

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = FleetPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, false);

    let result = engine.run().unwrap();
    assert!(result.ends_with("mapa_clientes.html"));

    let out = Path::new(&output_path);
    let html = std::fs::read_to_string(out.join("mapa_clientes.html")).unwrap();
    assert!(html.contains("leaflet"));
    assert!(html.contains("Caminhão: ABC1D23"));
    assert!(html.contains("Caminhão: XYZ9K87"));
    assert!(html.contains("Casa de origem"));
    assert!(html.contains("<b>🏬 Número de Clientes:</b> 2"));
    assert!(html.contains("<li>ABC1D23: 100%</li>"));
    assert!(html.contains("<li>XYZ9K87: n/a</li>"));
    assert!(html.contains("10/04/2025"));
    assert!(!html.contains("Sem Coordenada"));

    let csv = std::fs::read_to_string(out.join("truck_summary.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("ABC1D23,2,2000.0,2000.0,100.0,"));
    assert!(lines[2].starts_with("XYZ9K87,1,300.0,0.0,,"));

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out.join("fleet_report.json")).unwrap()).unwrap();
    assert_eq!(json["stats"]["rows_read"], 4);
    assert_eq!(json["stats"]["rows_skipped"], 1);
    assert_eq!(json["summary"]["customer_count"], 2);
    assert_eq!(json["summary"]["gaps"][0]["truck_id"], "XYZ9K87");
}

#[test]
fn test_end_to_end_zip_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().display().to_string();
    let input = write_input(temp_dir.path(), "entregas.csv", DELIVERIES.as_bytes());

    let config = cli_config(&input, &output_path, &["--formats", "html,csv", "--zip"]);
    let storage = LocalStorage::new(output_path.clone());
    let engine = EtlEngine::new(FleetPipeline::new(storage, config));

    let result = engine.run().unwrap();
    assert!(result.contains("fleet_map.zip"));

    let full_path = Path::new(&output_path).join("fleet_map.zip");
    assert!(full_path.exists());
    assert!(!Path::new(&output_path).join("mapa_clientes.html").exists());

    let zip_data = std::fs::read(&full_path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 2);

    let mut csv_content = String::new();
    archive
        .by_name("truck_summary.csv")
        .unwrap()
        .read_to_string(&mut csv_content)
        .unwrap();
    assert!(csv_content.contains("truck_id,deliveries"));
    assert!(csv_content.contains("ABC1D23"));
}

#[test]
fn test_analyze_reports_utilization() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "entregas.csv", DELIVERIES.as_bytes());
    let output_path = temp_dir.path().join("never").display().to_string();

    let config = cli_config(&input, &output_path, &[]);
    let engine = EtlEngine::new(FleetPipeline::new(LocalStorage::new(output_path.clone()), config));

    let report = engine.analyze().unwrap();

    assert_eq!(report.records.len(), 3);
    let abc = report.summary.get("ABC1D23").unwrap();
    assert_eq!(abc.total_weight, 2000.0);
    assert_eq!(abc.utilization, Utilization::Percent(100.0));
    assert_eq!(abc.total_revenue, 3750.75);
    assert_eq!(
        report.summary.get("XYZ9K87").unwrap().utilization,
        Utilization::Unavailable
    );
    assert!(!Path::new(&output_path).exists());
}

#[test]
fn test_missing_column_is_schema_error() {
    let temp_dir = TempDir::new().unwrap();
    let table = "CAMINHAO;PESO;LATITUDE;LONGITUDE\nT1;10;-3.7;-38.5\n";
    let input = write_input(temp_dir.path(), "entregas.csv", table.as_bytes());
    let output_path = temp_dir.path().display().to_string();

    let config = cli_config(&input, &output_path, &[]);
    let engine = EtlEngine::new(FleetPipeline::new(LocalStorage::new(output_path), config));

    let err = engine.run().unwrap_err();
    match &err {
        FleetError::SchemaError { column, found } => {
            assert_eq!(column, "CARGA");
            assert!(found.contains("CAMINHAO"));
        }
        other => panic!("expected schema error, got {:?}", other),
    }
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_windows_1252_input() {
    let temp_dir = TempDir::new().unwrap();
    let (encoded, _, had_errors) = encoding_rs::WINDOWS_1252.encode(DELIVERIES);
    assert!(!had_errors);
    let input = write_input(temp_dir.path(), "entregas.csv", &encoded);
    let output_path = temp_dir.path().display().to_string();

    let utf8_config = cli_config(&input, &output_path, &[]);
    let engine = EtlEngine::new(FleetPipeline::new(
        LocalStorage::new(output_path.clone()),
        utf8_config,
    ));
    assert!(matches!(engine.analyze(), Err(FleetError::DecodeError { .. })));

    let config = cli_config(&input, &output_path, &["--encoding", "windows-1252"]);
    let engine = EtlEngine::new(FleetPipeline::new(LocalStorage::new(output_path), config));
    let report = engine.analyze().unwrap();
    assert_eq!(report.records[0].customer_name, "Padaria São João");
}

#[test]
fn test_toml_config_drives_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "entregas.csv", DELIVERIES.as_bytes());
    let output_path = temp_dir.path().join("mapas").display().to_string();

    let toml_content = format!(
        r#"
[pipeline]
name = "entregas"

[source]
path = "{}"

[render]
origin_label = "VALEMILK-CD"
updated = "01/01/2025"

[load]
output_path = "{}"
output_formats = ["html"]

[load.filenames]
html = "rotas.html"
"#,
        input.replace('\\', "/"),
        output_path.replace('\\', "/")
    );

    let config = TomlConfig::from_toml_str(&toml_content).unwrap();
    assert!(config.validate().is_ok());

    let storage = LocalStorage::new(config.output_path().to_string());
    let engine = EtlEngine::new(FleetPipeline::new(storage, config));
    engine.run().unwrap();

    let html = std::fs::read_to_string(Path::new(&output_path).join("rotas.html")).unwrap();
    assert!(html.contains("VALEMILK-CD"));
    assert!(html.contains("01/01/2025"));
}
