use serde::{Serialize, Serializer};

/// Boolean column rendered as `TRUE` / `FALSE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag(pub bool);

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            true => write!(f, "TRUE"),
            false => write!(f, "FALSE"),
        }
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of the exported table. Field names double as the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRow {
    /// 1-based sequence number
    #[serde(rename = "S.No")]
    pub serial: usize,
    /// Base file name
    #[serde(rename = "File Name")]
    pub file_name: String,
    /// Contributing users joined with ", "
    #[serde(rename = "Modified By")]
    pub modified_by: String,
    #[serde(rename = "Is_Modified")]
    pub is_modified: Flag,
    #[serde(rename = "Is_Added_New")]
    pub is_added_new: Flag,
}

/// Column titles in output order.
pub const HEADERS: [&str; 5] = ["S.No", "File Name", "Modified By", "Is_Modified", "Is_Added_New"];

impl FileRow {
    /// Cell values in `HEADERS` order, for terminal rendering.
    pub fn cells(&self) -> [String; 5] {
        [
            self.serial.to_string(),
            self.file_name.clone(),
            self.modified_by.clone(),
            self.is_modified.to_string(),
            self.is_added_new.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_display() {
        assert_eq!(Flag(true).to_string(), "TRUE");
        assert_eq!(Flag(false).to_string(), "FALSE");
    }

    #[test]
    fn test_row_cells_order() {
        let row = FileRow {
            serial: 3,
            file_name: "main.rs".to_string(),
            modified_by: "alice, bob".to_string(),
            is_modified: Flag(true),
            is_added_new: Flag(false),
        };
        assert_eq!(row.cells(), ["3", "main.rs", "alice, bob", "TRUE", "FALSE"]);
    }
}
