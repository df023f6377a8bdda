use anyhow::Result;
use bridge_translate::IntentClassifier;

use crate::output::{self, OutputFormat};

pub fn execute(text: &str, format: OutputFormat) -> Result<()> {
    let request = IntentClassifier::new().classify(text, None);
    output::print(&request, format)
}
