//! Seed File Tests
//!
//! Loading seed documents from disk and seeding a registry from them.

#[cfg(test)]
mod seed_file_tests {
    use anyhow::Result;
    use selections_core::services::{load_seed_file, seed_vocabulary, Registry, SeedReport};
    use selections_core::InMemoryStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    const VOCABULARIES: &str = r#"[
        { "name": "Ticket Priority", "system_code": "ticket_priority", "children": [
            { "name": "Low", "position": 1 },
            { "name": "Medium", "position": 2, "is_default": true },
            { "name": "High", "position": 3 }
        ]},
        { "name": "Categories", "children": [
            { "name": "Billing" },
            { "name": "Outages" }
        ]}
    ]"#;

    /// Helper to write a seed document into a temporary directory
    async fn write_seed(contents: &str) -> Result<(std::path::PathBuf, TempDir)> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("vocabularies.json");
        tokio::fs::write(&path, contents).await?;
        Ok((path, temp_dir))
    }

    #[tokio::test]
    async fn test_seed_from_file() -> Result<()> {
        let (path, _temp_dir) = write_seed(VOCABULARIES).await?;
        let registry = Registry::new(Arc::new(InMemoryStore::new()));

        let seeds = load_seed_file(&path).await?;
        let report = seed_vocabulary(&registry, &seeds).await?;
        assert_eq!(report, SeedReport { created: 7, reused: 0 });

        let medium = registry
            .find_by_code("ticket_priority_medium")
            .await?
            .expect("medium should be seeded");
        assert!(medium.is_default);
        assert_eq!(medium.position(), Some(2));

        // Names are singularized into codes
        assert!(registry.find_by_code("category_outage").await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_file_reports_path() -> Result<()> {
        let (path, _temp_dir) = write_seed("{ not json").await?;

        let err = load_seed_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("vocabularies.json"));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        assert!(load_seed_file(temp_dir.path().join("absent.json"))
            .await
            .is_err());
        Ok(())
    }
}
