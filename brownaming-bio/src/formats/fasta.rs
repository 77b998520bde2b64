use crate::sequence::Sequence;
use brownaming_core::{BrownamingError, BrownamingResult};
use flate2::read::GzDecoder;
use nom::{
    bytes::complete::{tag, take_till1},
    character::complete::space1,
    combinator::{opt, rest},
    sequence::preceded,
    IResult,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Residues per output line
const LINE_WIDTH: usize = 60;

/// Parse a FASTA header line into (id, description)
fn parse_header(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    let (input, _) = tag(">")(input)?;
    let (input, id) = take_till1(|c: char| c.is_whitespace())(input)?;
    let (input, description) = opt(preceded(space1, rest))(input)?;
    Ok((input, (id, description.map(str::trim_end).filter(|d| !d.is_empty()))))
}

fn parse_reader<R: BufRead>(reader: R) -> BrownamingResult<Vec<Sequence>> {
    let mut sequences = Vec::new();
    let mut current: Option<Sequence> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');

        if line.starts_with('>') {
            if let Some(seq) = current.take() {
                sequences.push(seq);
            }
            let (_, (id, description)) = parse_header(line).map_err(|_| {
                BrownamingError::Parse(format!(
                    "Failed to parse FASTA header on line {}: {:?}",
                    line_no + 1,
                    line
                ))
            })?;
            let mut seq = Sequence::new(id.to_string(), Vec::new());
            if let Some(desc) = description {
                seq = seq.with_description(desc.to_string());
            }
            current = Some(seq);
        } else if line.trim().is_empty() {
            continue;
        } else {
            match current.as_mut() {
                Some(seq) => seq
                    .sequence
                    .extend(line.bytes().filter(|c| !c.is_ascii_whitespace())),
                None => {
                    return Err(BrownamingError::Parse(format!(
                        "Sequence data before first FASTA header on line {}",
                        line_no + 1
                    )))
                }
            }
        }
    }

    if let Some(seq) = current {
        sequences.push(seq);
    }

    Ok(sequences)
}

/// Parse FASTA from bytes
pub fn parse_fasta_from_bytes(data: &[u8]) -> BrownamingResult<Vec<Sequence>> {
    parse_reader(BufReader::new(data))
}

/// Parse a FASTA file into sequences (supports .gz compression)
pub fn parse_fasta<P: AsRef<Path>>(path: P) -> BrownamingResult<Vec<Sequence>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        BrownamingError::NotFound(format!("FASTA file {}: {}", path.display(), e))
    })?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        parse_reader(BufReader::new(GzDecoder::new(file)))
    } else {
        parse_reader(BufReader::new(file))
    }
}

fn write_record<W: Write>(writer: &mut W, seq: &Sequence) -> BrownamingResult<()> {
    writeln!(writer, "{}", seq.header())?;
    for chunk in seq.sequence.chunks(LINE_WIDTH) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Write sequences to a FASTA file
pub fn write_fasta<P: AsRef<Path>>(path: P, sequences: &[Sequence]) -> BrownamingResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for seq in sequences {
        write_record(&mut writer, seq)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write only the records whose id is in `pending`; returns the number written
pub fn write_pending_fasta<P: AsRef<Path>>(
    path: P,
    sequences: &[Sequence],
    pending: &HashSet<&str>,
) -> BrownamingResult<usize> {
    let mut writer = BufWriter::new(File::create(path)?);
    let mut written = 0;
    for seq in sequences.iter().filter(|s| pending.contains(s.id.as_str())) {
        write_record(&mut writer, seq)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
