use regex::Regex;

/// Header text for queries without a usable hit
pub const UNCHARACTERIZED: &str = "Uncharacterized protein";

/// Field extraction from UniProt-style subject titles, e.g.
/// `sp|P68871|HBB_HUMAN Hemoglobin subunit beta OS=Homo sapiens OX=9606 GN=HBB PE=1 SV=2`
pub struct TitleParser {
    description: Regex,
    gene: Regex,
}

impl TitleParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            // From the first space to the last " OS="
            description: Regex::new(r"^\S* (.*) OS=")?,
            gene: Regex::new(r" GN=([^ ]+)")?,
        })
    }

    pub fn description<'t>(&self, title: &'t str) -> Option<&'t str> {
        self.description
            .captures(title)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    pub fn gene_name<'t>(&self, title: &'t str) -> Option<&'t str> {
        self.gene
            .captures(title)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// `<description> FROM <species>`, or [`UNCHARACTERIZED`] when the title carries no description
    pub fn renamed_description(&self, title: Option<&str>, species: &str) -> String {
        match title.and_then(|t| self.description(t)) {
            Some(description) => format!("{} FROM {}", description, species),
            None => UNCHARACTERIZED.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HBB: &str = "sp|P68871|HBB_HUMAN Hemoglobin subunit beta OS=Homo sapiens OX=9606 GN=HBB PE=1 SV=2";

    #[test]
    fn test_description() {
        let parser = TitleParser::new().unwrap();
        assert_eq!(parser.description(HBB), Some("Hemoglobin subunit beta"));
        assert_eq!(parser.description("sp|X|Y no species here"), None);
        assert_eq!(parser.description("single_token"), None);
    }

    #[test]
    fn test_description_stops_at_last_species_tag() {
        let parser = TitleParser::new().unwrap();
        let title = "tr|A0A|A0A_9PRIM Fusion OS=a OS=Pan troglodytes OX=9598";
        assert_eq!(parser.description(title), Some("Fusion OS=a"));
    }

    #[test]
    fn test_gene_name() {
        let parser = TitleParser::new().unwrap();
        assert_eq!(parser.gene_name(HBB), Some("HBB"));
        assert_eq!(parser.gene_name("sp|X|Y Protein OS=Homo sapiens OX=9606"), None);
    }

    #[test]
    fn test_renamed_description() {
        let parser = TitleParser::new().unwrap();
        assert_eq!(
            parser.renamed_description(Some(HBB), "Homo sapiens"),
            "Hemoglobin subunit beta FROM Homo sapiens"
        );
        assert_eq!(parser.renamed_description(None, "Homo sapiens"), UNCHARACTERIZED);
        assert_eq!(
            parser.renamed_description(Some("sp|X|Y bare title"), "Homo sapiens"),
            UNCHARACTERIZED
        );
    }
}
