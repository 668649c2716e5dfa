/// Display labels for boolean cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BooleanLabels {
    /// Shown for a stored `0`
    pub false_label: String,
    /// Shown for any other stored value
    pub true_label: String,
}

impl BooleanLabels {
    pub fn new(false_label: impl Into<String>, true_label: impl Into<String>) -> Self {
        Self {
            false_label: false_label.into(),
            true_label: true_label.into(),
        }
    }

    /// `FALSE` / `TRUE`, as an English locale of a spreadsheet application shows them.
    pub fn english() -> Self {
        Self::new("FALSE", "TRUE")
    }

    /// Maps the stored value of a boolean cell to its label.
    pub fn label(&self, value: &str) -> &str {
        if value == "0" {
            &self.false_label
        } else {
            &self.true_label
        }
    }
}

impl Default for BooleanLabels {
    /// Russian labels used by the schedules this crate was written for.
    fn default() -> Self {
        Self::new("ЛОЖЬ", "ИСТИНА")
    }
}

/// Options applied to every sheet of an opened workbook.
#[derive(Clone, Debug, Default)]
pub struct AccessorOptions {
    /// Labels returned as the text of boolean cells.
    pub boolean_labels: BooleanLabels,
}

impl AccessorOptions {
    pub fn with_boolean_labels(mut self, boolean_labels: BooleanLabels) -> Self {
        self.boolean_labels = boolean_labels;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        let labels = AccessorOptions::default().boolean_labels;
        assert_eq!(labels.label("0"), "ЛОЖЬ");
        assert_eq!(labels.label("1"), "ИСТИНА");
        assert_eq!(labels.label("true"), "ИСТИНА");
    }

    #[test]
    fn test_custom_labels() {
        let options = AccessorOptions::default().with_boolean_labels(BooleanLabels::english());
        assert_eq!(options.boolean_labels.label("0"), "FALSE");
        assert_eq!(options.boolean_labels.label("1"), "TRUE");
    }
}
