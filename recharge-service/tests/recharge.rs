use std::{fs, path::Path};

use recharge_client::{schema, Table};
use recharge_service::{
    config::AppConfig,
    sinks::ledger::{COMMERCIAL_CHARGES, HISTORICAL_CHARGES, HISTORICAL_READINGS, NEW_FORM, RESIDENT_CHARGES},
    sources::table_file::read_delimited,
    PipelineError, Site,
};

const READINGS: &str = "\
Datetime,Site,Utility/Meter,Sub Utility,Flow,Previous meter reading,Previous meter reading date,Present meter reading,Present meter reading date
03/15/24,House A,G,Boiler,,100,02/15/24,150,03/15/24
03/15/24,Unit 1,E,Lights,,200,02/15/24,260,03/15/24
03/15/24,Unit 1,E,Solar,True,10,02/15/24,30,03/15/24
03/15/24,Cafe,W,,,5,02/15/24,7,03/15/24
03/15/24,Unit 9,E,,,0,,10,
";

const GAS: &str = "mpr,period_from,consumption_kWh,net_charge\nG-1,2024-03-16,1000,100\n";
const ELECTRIC: &str = "MPAN/MPR,Date,Total Adjusted Energy Consumption (kWh),Total Net (GBP)\nE-1,2024-03-14,400,100\n";
const WATER: &str = "MPAN/MPR,Date,Consumption (m3),Cost (£)\nW-1,2024-03-15,10,30\n";
const PRIOR_CHARGES: &str = ",Period from,Residential/Commercial site,Utility/Meter,Gross charge (GBP)\n0,2024-02-15,Unit 1,E,12.5\n";

fn write_fixtures(dir: &Path) -> AppConfig {
    fs::write(dir.join("readings.csv"), READINGS).unwrap();
    fs::write(dir.join("gas.csv"), GAS).unwrap();
    fs::write(dir.join("electric.csv"), ELECTRIC).unwrap();
    fs::write(dir.join("water.csv"), WATER).unwrap();
    fs::write(dir.join("prior_charges.csv"), PRIOR_CHARGES).unwrap();

    let toml = format!(
        r#"
[site]
name = "Oakfield"
output_root = '{root}'

[inputs]
readings = '{root}/readings.csv'
gas_invoices = '{root}/gas.csv'
electric_invoices = '{root}/electric.csv'
water_invoices = '{root}/water.csv'
historical_charges = '{root}/prior_charges.csv'

[tenants]
commercial = ["Cafe"]

[tenants.identifiers.House]
mpr = "G-1"

[tenants.identifiers."Unit 1"]
mpan = "E-1"

[tenants.identifiers.Cafe]
water = "W-1"

[tenants.fixed_charges."Unit 1"]
E = 5.0

[tenants.fixed_charges.Cafe]
W = 2.0

[tenants.multipliers."Unit 1"]
E = 2.0
"#,
        root = dir.display()
    );
    AppConfig::from_toml(&toml).unwrap()
}

fn gross(table: &Table, row: usize) -> f64 {
    table
        .row(row)
        .and_then(|r| r.get(schema::GROSS_CHARGE))
        .unwrap()
        .parse()
        .unwrap()
}

#[test]
fn full_recharge_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_fixtures(dir.path());

    let summary = Site::from_config(&cfg).recharge_tenants(None).unwrap();

    let out = dir.path().join("Oakfield_March_2024");
    assert_eq!(summary.output_dir, out);
    assert_eq!(summary.readings, 5);
    assert_eq!(summary.charged_rows, 4);
    assert_eq!(summary.unresolved_identifiers, 1);
    assert_eq!(summary.unrated_readings, 1);
    assert_eq!(summary.total_gross, 38.0);

    let bytes = fs::read(out.join(COMMERCIAL_CHARGES)).unwrap();
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));

    let commercial = read_delimited(&out.join(COMMERCIAL_CHARGES)).unwrap();
    assert_eq!(commercial.headers(), &schema::CHARGE_COLUMNS);
    assert_eq!(commercial.len(), 1);
    assert_eq!(commercial.row(0).unwrap().get(schema::SITE), Some("Cafe"));
    assert_eq!(gross(&commercial, 0), 8.0);

    let residents = read_delimited(&out.join(RESIDENT_CHARGES)).unwrap();
    let sites: Vec<&str> = residents.iter().filter_map(|r| r.get(schema::SITE)).collect();
    assert_eq!(sites, vec!["House A", "Unit 1", "Unit 9"]);
    assert_eq!(gross(&residents, 0), 5.0);
    assert_eq!(gross(&residents, 1), 25.0);
    assert_eq!(residents.row(1).unwrap().get(schema::CONSUMPTION), Some("80"));
    assert_eq!(residents.row(1).unwrap().get(schema::READING_MULTIPLIER), Some("2"));
    assert_eq!(residents.row(2).unwrap().get(schema::IDENTIFIER), Some("0"));
    assert_eq!(gross(&residents, 2), 0.0);

    let form = read_delimited(&out.join(NEW_FORM)).unwrap();
    assert_eq!(form.headers()[0], schema::PERIOD_FROM);
    assert_eq!(form.len(), 5);
    let first = form.row(0).unwrap();
    assert_eq!(first.get(schema::PERIOD_FROM), Some("2024-04-15"));
    assert_eq!(first.get(schema::PREVIOUS_READING), Some("150"));
    assert_eq!(first.get(schema::PREVIOUS_DATE), Some("03/15/24"));
    assert_eq!(first.get(schema::PRESENT_READING), Some(""));

    let charges_ledger = read_delimited(&out.join(HISTORICAL_CHARGES)).unwrap();
    assert!(charges_ledger.headers().iter().all(|h| !schema::is_index_column(h)));
    assert_eq!(charges_ledger.len(), 5);
    assert_eq!(charges_ledger.row(0).unwrap().get(schema::PERIOD_FROM), Some("2024-03-15"));
    assert_eq!(charges_ledger.row(4).unwrap().get(schema::PERIOD_FROM), Some("2024-02-15"));
    assert_eq!(gross(&charges_ledger, 4), 12.5);

    let readings_ledger = read_delimited(&out.join(HISTORICAL_READINGS)).unwrap();
    assert_eq!(readings_ledger.headers(), &schema::READING_COLUMNS);
    assert_eq!(readings_ledger.len(), 5);
}

#[test]
fn identical_inputs_give_identical_digests() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_fixtures(dir.path());
    let site = Site::from_config(&cfg);

    let first = site.recharge_tenants(None).unwrap();
    let second = site.recharge_tenants(None).unwrap();
    assert_eq!(first.digest, second.digest);
    assert_eq!(first.total_gross, second.total_gross);
}

#[test]
fn explicit_month_names_the_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_fixtures(dir.path());

    let month = time::macros::date!(2024 - 02 - 01);
    let summary = Site::from_config(&cfg).recharge_tenants(Some(month)).unwrap();
    assert_eq!(summary.output_dir, dir.path().join("Oakfield_February_2024"));
}

#[test]
fn missing_readings_abort_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = write_fixtures(dir.path());
    fs::remove_file(dir.path().join("readings.csv")).unwrap();

    let err = Site::from_config(&cfg).recharge_tenants(None).unwrap_err();
    assert!(matches!(err, PipelineError::Source { .. }));
    assert!(!dir.path().join("Oakfield_March_2024").exists());
}
