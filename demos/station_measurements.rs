// demos/station_measurements.rs
use tahmo::{Tahmo, TahmoError};

fn main() -> Result<(), TahmoError> {
    // Set RUST_LOG=info (or debug) to see each API request
    env_logger::init();

    // Credentials come from TAHMO_API_KEY / TAHMO_API_SECRET
    let client = Tahmo::from_env()?;

    let station = std::env::args().nth(1).unwrap_or_else(|| "TA00021".to_string());
    println!("Fetching temperature and humidity for station {}", station);

    match client
        .measurements()
        .station(&station)
        .start("2023-01-01")
        .end("2023-01-07 23:59:59")
        .variables(&["te", "rh"])
        .call()
    {
        Ok(table) => {
            println!("Columns: {:?}", table.column_names());
            let df = table.to_dataframe()?;
            println!("Shape: {:?}", df.shape());
            println!("{}", df.tail(Some(5)));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(e);
        }
    }

    Ok(())
}
