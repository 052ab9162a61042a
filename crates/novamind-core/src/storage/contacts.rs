use crate::error::{NovaMindError, Result};
use novamind_types::{Contact, ContactDataset};
use std::fs;
use std::path::Path;

/// Read the mock contact dataset (`{"contacts": [...]}`)
pub fn load_contacts<P: AsRef<Path>>(path: P) -> Result<Vec<Contact>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        NovaMindError::NotFound(format!("Contact dataset {}: {}", path.display(), e))
    })?;

    let dataset: ContactDataset = serde_json::from_str(&content)?;
    log::info!("Loaded {} contacts from {}", dataset.contacts.len(), path.display());
    Ok(dataset.contacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_contacts_with_optional_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("contacts.json");
        fs::write(&path, r#"{"contacts": [
            {"email": "sarah@agency.io", "firstname": "Sarah", "persona": "founders"},
            {"email": "leo@studio.io", "persona": "creatives", "company": "Studio"}
        ]}"#).unwrap();

        let contacts = load_contacts(&path).unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].firstname.as_deref(), Some("Sarah"));
        assert!(contacts[1].lastname.is_none());
    }

    #[test]
    fn test_missing_dataset_is_not_found() {
        let result = load_contacts("/nonexistent/contacts.json");
        assert!(matches!(result, Err(NovaMindError::NotFound(_))));
    }
}
