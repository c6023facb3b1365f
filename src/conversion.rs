// Conversion types: the tag sent in the `type` form field and the file
// extensions each tag accepts when picking a file.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::bail;

/// Conversion requested from the backend. Unknown tags are kept as-is in
/// `Other` so the server can decide what to do with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionType {
    Word,
    Excel,
    Ppt,
    Jpg,
    Other(String),
}

impl ConversionType {
    /// The known conversions, in the order the menu shows them.
    pub const KNOWN: [ConversionType; 4] = [
        ConversionType::Word,
        ConversionType::Excel,
        ConversionType::Ppt,
        ConversionType::Jpg,
    ];

    /// Tag as the backend expects it in the `type` field.
    pub fn tag(&self) -> &str {
        match self {
            ConversionType::Word => "word",
            ConversionType::Excel => "excel",
            ConversionType::Ppt => "ppt",
            ConversionType::Jpg => "jpg",
            ConversionType::Other(tag) => tag,
        }
    }

    /// Human label used by the menu.
    pub fn label(&self) -> String {
        match self {
            ConversionType::Word => "Word to PDF".into(),
            ConversionType::Excel => "Excel to PDF".into(),
            ConversionType::Ppt => "PowerPoint to PDF".into(),
            ConversionType::Jpg => "JPG to PDF".into(),
            ConversionType::Other(tag) => format!("{} to PDF", tag.to_uppercase()),
        }
    }

    /// Extensions (without the dot) accepted for this conversion. An empty
    /// slice means any file.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ConversionType::Word => &["doc", "docx"],
            ConversionType::Excel => &["xls", "xlsx"],
            ConversionType::Ppt => &["ppt", "pptx"],
            ConversionType::Jpg => &["jpg", "jpeg", "png"],
            ConversionType::Other(_) => &[],
        }
    }

    /// Accept string in the `.ext, .ext` form, or `*/*` for any file.
    pub fn accept_types(&self) -> String {
        let exts = self.extensions();
        if exts.is_empty() {
            return "*/*".into();
        }
        exts.iter()
            .map(|e| format!(".{}", e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether `path` carries one of the accepted extensions. Comparison
    /// ignores case; `Other` accepts everything.
    pub fn accepts(&self, path: &Path) -> bool {
        let exts = self.extensions();
        if exts.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| exts.iter().any(|x| x.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

impl FromStr for ConversionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s {
            "word" => ConversionType::Word,
            "excel" => ConversionType::Excel,
            "ppt" => ConversionType::Ppt,
            "jpg" => ConversionType::Jpg,
            "" => bail!("conversion type must not be empty"),
            other => ConversionType::Other(other.to_string()),
        };
        Ok(ty)
    }
}

impl fmt::Display for ConversionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn accept_strings_match_known_types() {
        assert_eq!(ConversionType::Word.accept_types(), ".doc, .docx");
        assert_eq!(ConversionType::Excel.accept_types(), ".xls, .xlsx");
        assert_eq!(ConversionType::Ppt.accept_types(), ".ppt, .pptx");
        assert_eq!(ConversionType::Jpg.accept_types(), ".jpg, .jpeg, .png");
        assert_eq!(ConversionType::Other("odt".into()).accept_types(), "*/*");
    }

    #[test]
    fn parse_keeps_unknown_tags() {
        assert_eq!("word".parse::<ConversionType>().unwrap(), ConversionType::Word);
        assert_eq!(
            "Word".parse::<ConversionType>().unwrap(),
            ConversionType::Other("Word".into())
        );
        assert_eq!("svg".parse::<ConversionType>().unwrap().tag(), "svg");
        assert!("".parse::<ConversionType>().is_err());
    }

    #[test]
    fn extension_check_ignores_case() {
        assert!(ConversionType::Jpg.accepts(&PathBuf::from("photo.PNG")));
        assert!(ConversionType::Word.accepts(&PathBuf::from("/tmp/report.docx")));
        assert!(!ConversionType::Word.accepts(&PathBuf::from("report.pdf")));
        assert!(!ConversionType::Excel.accepts(&PathBuf::from("noext")));
        assert!(ConversionType::Other("x".into()).accepts(&PathBuf::from("noext")));
    }
}
