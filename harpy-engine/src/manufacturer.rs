use crate::{Error, Result};
use harpy_packets::MacAddr;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::mem;
use std::path::Path;
use tracing::debug;

/// OUI to manufacturer name mapping.
///
/// Keys are six lowercase hex characters, the first three octets of a hardware address. The
/// mapping is built once before the engines start and only ever read afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Manufacturers {
    db: HashMap<String, String>,
}

impl Manufacturers {
    pub fn new(db: HashMap<String, String>) -> Self {
        Manufacturers { db }
    }

    /// Loads the JSON cache at `path`. A missing or unreadable cache is an empty database, not
    /// an error: discovery works without vendor names.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let db: Result<HashMap<String, String>> = File::open(path)
            .map_err(Error::from)
            .and_then(|file| Ok(serde_json::from_reader(BufReader::new(file))?));
        match db {
            Ok(db) => Manufacturers { db },
            Err(err) => {
                debug!(path = %path.display(), error = %err, "no manufacturer database");
                Manufacturers::default()
            }
        }
    }

    /// Writes the database to `path` as a compact JSON object.
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &self.db)?;
        writer.flush()?;
        Ok(())
    }

    /// Parses the IEEE registration authority CSV (`oui.csv`).
    ///
    /// The first record is a header. Of each following record only the assignment (second
    /// column) and the organization name (third column) are kept. Quoted fields may contain
    /// commas, `""` escapes and line breaks.
    pub fn from_csv<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let mut db = HashMap::new();
        for (line, record) in records(&text).into_iter().skip(1) {
            match (record.get(1), record.get(2)) {
                (Some(assignment), Some(name)) => {
                    db.insert(assignment.trim().to_lowercase(), name.trim().to_string());
                }
                _ => {
                    return Err(Error::Manufacturers(format!(
                        "line {}: expected at least 3 columns, found {}",
                        line,
                        record.len()
                    )))
                }
            }
        }
        Ok(Manufacturers { db })
    }

    /// Manufacturer of `mac`, or the empty string when its prefix is unknown.
    pub fn lookup(&self, mac: &MacAddr) -> &str {
        self.db.get(&mac.oui()).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

// Splits CSV text into records, each paired with the line it starts on. Blank lines are
// skipped.
fn records(text: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = vec![];
    let mut fields = vec![];
    let mut field = String::new();
    let mut quoted = false;
    let mut line = 1;
    let mut start = 1;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(mem::take(&mut field)),
            '\r' if !quoted && chars.peek() == Some(&'\n') => {}
            '\n' if !quoted => {
                fields.push(mem::take(&mut field));
                if !(fields.len() == 1 && fields[0].trim().is_empty()) {
                    records.push((start, mem::take(&mut fields)));
                }
                fields.clear();
                line += 1;
                start = line;
            }
            _ => {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
        }
    }
    if !fields.is_empty() || !field.trim().is_empty() {
        fields.push(field);
        records.push((start, fields));
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const OUI_CSV: &str = "\
Registry,Assignment,Organization Name,Organization Address
MA-L,002272,American Micro-Fuel Device Corp.,2181 Buchanan Loop Ferndale WA US 98248
MA-L,00D0EF,IGT,9295 PROTOTYPE DRIVE RENO NV US 89511
MA-L,086195,\"Rockwell Automation, Inc.\",1 Allen-Bradley Dr. Mayfield Heights OH US 44124
MA-L,F4BD9E,\"Cisco \"\"Systems\"\", Inc\",80 West Tasman Drive San Jose CA US 94568
";

    #[test]
    fn parses_ieee_csv() {
        let db = Manufacturers::from_csv(Cursor::new(OUI_CSV)).unwrap();
        assert_eq!(db.len(), 4);
        assert_eq!(
            db.lookup(&MacAddr::new([0x00, 0x22, 0x72, 0x01, 0x02, 0x03])),
            "American Micro-Fuel Device Corp."
        );
        assert_eq!(
            db.lookup(&MacAddr::new([0x08, 0x61, 0x95, 0, 0, 0])),
            "Rockwell Automation, Inc."
        );
        assert_eq!(
            db.lookup(&MacAddr::new([0xf4, 0xbd, 0x9e, 0xff, 0xff, 0xff])),
            "Cisco \"Systems\", Inc"
        );
    }

    #[test]
    fn unknown_prefix_is_empty() {
        let db = Manufacturers::from_csv(Cursor::new(OUI_CSV)).unwrap();
        assert_eq!(db.lookup(&MacAddr::new([0x02, 0, 0, 0, 0, 1])), "");
        assert_eq!(Manufacturers::default().lookup(&MacAddr::BROADCAST), "");
    }

    #[test]
    fn short_record_is_an_error() {
        let csv = "Registry,Assignment,Organization Name\nMA-L,002272\n";
        assert!(Manufacturers::from_csv(Cursor::new(csv)).is_err());
    }

    #[test]
    fn quoted_fields_span_lines() {
        let csv = "Registry,Assignment,Organization Name,Organization Address\r\n\
MA-L,002272,\"Acme\nLabs\",Somewhere\r\n\
\r\n\
MA-L,00D0EF,IGT,\"9295 PROTOTYPE DRIVE\r\nRENO NV US 89511\"\r\n\
MA-L,086195,Rockwell";
        let db = Manufacturers::from_csv(Cursor::new(csv)).unwrap();
        assert_eq!(db.len(), 3);
        assert_eq!(
            db.lookup(&MacAddr::new([0x00, 0x22, 0x72, 0, 0, 0])),
            "Acme\nLabs"
        );
        assert_eq!(db.lookup(&MacAddr::new([0x00, 0xd0, 0xef, 0, 0, 0])), "IGT");
        assert_eq!(
            db.lookup(&MacAddr::new([0x08, 0x61, 0x95, 0, 0, 0])),
            "Rockwell"
        );
    }

    #[test]
    fn short_record_reports_its_first_line() {
        let csv = "Registry,Assignment,Organization Name\nMA-L,002272,\"A\nB\"\nMA-L,00D0EF\n";
        match Manufacturers::from_csv(Cursor::new(csv)) {
            Err(Error::Manufacturers(message)) => {
                assert!(message.starts_with("line 4:"), "{}", message)
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn dump_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oui.json");

        let db = Manufacturers::from_csv(Cursor::new(OUI_CSV)).unwrap();
        db.dump(&path).unwrap();

        assert_eq!(Manufacturers::load(&path), db);
    }

    #[test]
    fn load_tolerates_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Manufacturers::load(dir.path().join("missing.json")).is_empty());

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, b"{\"002272\": ").unwrap();
        assert!(Manufacturers::load(&corrupt).is_empty());
    }
}
