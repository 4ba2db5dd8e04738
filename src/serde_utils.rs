use std::path::Path;

use eyre::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

async fn read_to_string(path: &Path) -> eyre::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Reading from {}", path.display()))
}

pub async fn read_deserialize<T>(path: impl AsRef<Path>) -> eyre::Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let content = read_to_string(path).await?;

    let value = serde_yaml::from_str(&content).with_context(|| {
        format!("Parsing {} content was {content}", path.display())
    })?;

    Ok(value)
}

pub async fn read_toml<T>(path: impl AsRef<Path>) -> eyre::Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let content = read_to_string(path).await?;

    let value = toml::from_str(&content)
        .with_context(|| format!("Parsing {}", path.display()))?;

    Ok(value)
}

pub async fn read_json<T>(path: impl AsRef<Path>) -> eyre::Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let content = read_to_string(path).await?;

    let value = serde_json::from_str(&content)
        .with_context(|| format!("Parsing {}", path.display()))?;

    Ok(value)
}

pub async fn write_serialize<T>(
    path: impl AsRef<Path>,
    value: T,
) -> eyre::Result<()>
where
    T: Serialize,
{
    let path = path.as_ref();

    let content = serde_yaml::to_string(&value)
        .with_context(|| format!("Serializing {}", path.display()))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Creating {}", parent.display()))?;
    }

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Writing to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[tokio::test]
    async fn yaml_written_into_missing_directory() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("value.yml");

        let value: BTreeMap<String, u64> =
            maplit::btreemap! { "runs".to_string() => 200 };

        write_serialize(&path, &value).await?;
        let read: BTreeMap<String, u64> = read_deserialize(&path).await?;

        assert_eq!(read, value);

        Ok(())
    }

    #[tokio::test]
    async fn missing_file_names_path() {
        let err = read_toml::<toml::Value>("does/not/exist.toml")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("does/not/exist.toml"));
    }
}
