use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use amazons_engine::CellBoard;
use amazons_evaluator::neural_network::WeightOrigin;
use anyhow::Context;

/// Write `value` as pretty-printed JSON to `output_path`, or to stdout
pub fn save_json<T>(value: &T, output_path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let (mut writer, target): (Box<dyn Write>, String) = match output_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            (Box::new(BufWriter::new(file)), path.display().to_string())
        }
        None => (Box::new(io::stdout().lock()), "stdout".to_owned()),
    };

    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {target}"))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to flush output to {target}"))?;
    Ok(())
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a board in its text form (`.` empty, `B`/`W` queens, `b`/`w` arrows)
///
/// # Errors
///
/// Returns error if the file cannot be read or is not a 10x10 board
pub fn read_board_file<P>(path: P) -> anyhow::Result<CellBoard>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read board file: {}", path.display()))?;
    CellBoard::parse(&text)
        .with_context(|| format!("Failed to parse board file: {}", path.display()))
}

/// Tell where the network weights came from
pub fn report_weight_origin(path: &Path, origin: &WeightOrigin) {
    match origin {
        WeightOrigin::Loaded => eprintln!("Loaded weights from {}", path.display()),
        WeightOrigin::Created => eprintln!("Created new weights at {}", path.display()),
        WeightOrigin::Replaced(e) => {
            eprintln!("Replaced unusable weight file {}: {e}", path.display());
        }
    }
}
