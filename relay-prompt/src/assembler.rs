//! [`PromptAssembler`]: base template ⊕ runtime facts ⊕ user memory (§4.2).

use crate::facts::RuntimeFacts;
use crate::memory::{self, DEFAULT_MEMORY_FILE_NAME};
use crate::source::{parse_toggle, OverrideSource};
use crate::template::DEFAULT_TEMPLATE;
use relay_types::ConfigError;
use std::path::{Path, PathBuf};

/// Static configuration for a [`PromptAssembler`] instance.
///
/// Per-call facts (cwd) are supplied to [`PromptAssembler::assemble`]; this
/// struct holds the defaults and the names of the two environment
/// variables the core recognizes.
pub struct PromptAssemblerConfig {
    /// Directory the default override path and the memory file live under.
    pub config_dir: PathBuf,
    /// Memory file name under `config_dir`.
    pub memory_file_name: String,
    /// Environment variable gating the system-prompt override.
    pub system_prompt_env: String,
    /// Environment variable gating exporting the built-in template.
    pub system_prompt_export_env: String,
}

impl Default for PromptAssemblerConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::new(),
            memory_file_name: DEFAULT_MEMORY_FILE_NAME.to_string(),
            system_prompt_env: "RELAY_SYSTEM_MD".to_string(),
            system_prompt_export_env: "RELAY_SYSTEM_MD_EXPORT".to_string(),
        }
    }
}

impl PromptAssemblerConfig {
    fn default_override_path(&self) -> PathBuf {
        self.config_dir.join("system.md")
    }

    fn memory_path(&self) -> PathBuf {
        self.config_dir.join(&self.memory_file_name)
    }
}

/// Builds the system instruction handed to the `ContentGenerator`.
pub struct PromptAssembler {
    config: PromptAssemblerConfig,
}

impl PromptAssembler {
    /// Create an assembler with the given configuration.
    pub fn new(config: PromptAssemblerConfig) -> Self {
        Self { config }
    }

    /// Assemble the full system instruction for a session rooted at `cwd`.
    pub async fn assemble(&self, cwd: &Path) -> Result<String, ConfigError> {
        self.maybe_export_default_template().await?;
        let base = self.resolve_base_template().await?;
        let facts = RuntimeFacts::gather(cwd).render();
        let memory = memory::load(&self.config.memory_path()).await?;

        let mut out = base;
        out.push_str("\n\n");
        out.push_str(&facts);
        if !memory.trim().is_empty() {
            out.push_str("\n\n");
            out.push_str(&memory);
        }
        Ok(out)
    }

    fn env_toggle(&self, var: &str) -> Option<OverrideSource> {
        std::env::var(var).ok().map(|raw| parse_toggle(&raw))
    }

    async fn resolve_base_template(&self) -> Result<String, ConfigError> {
        match self.env_toggle(&self.config.system_prompt_env) {
            None | Some(OverrideSource::Disabled) => Ok(DEFAULT_TEMPLATE.to_string()),
            Some(OverrideSource::EnabledDefault) => {
                read_required(&self.config.default_override_path()).await
            }
            Some(OverrideSource::Explicit(path)) => read_required(&path).await,
        }
    }

    async fn maybe_export_default_template(&self) -> Result<(), ConfigError> {
        let target = match self.env_toggle(&self.config.system_prompt_export_env) {
            None | Some(OverrideSource::Disabled) => return Ok(()),
            Some(OverrideSource::EnabledDefault) => self.config.default_override_path(),
            Some(OverrideSource::Explicit(path)) => path,
        };

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::Other(e.to_string()))?;
        }
        tokio::fs::write(&target, DEFAULT_TEMPLATE)
            .await
            .map_err(|e| ConfigError::Other(e.to_string()))?;
        tracing::info!(path = %target.display(), "exported built-in system prompt template");
        Ok(())
    }
}

async fn read_required(path: &Path) -> Result<String, ConfigError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|_| ConfigError::MissingOverrideFile(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize the tests that
    // touch them so they don't race each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn config_for(dir: &Path) -> PromptAssemblerConfig {
        PromptAssemblerConfig {
            config_dir: dir.to_path_buf(),
            memory_file_name: DEFAULT_MEMORY_FILE_NAME.to_string(),
            system_prompt_env: "RELAY_TEST_SYSTEM_MD".to_string(),
            system_prompt_export_env: "RELAY_TEST_SYSTEM_MD_EXPORT".to_string(),
        }
    }

    fn clear_env() {
        unsafe {
            std::env::remove_var("RELAY_TEST_SYSTEM_MD");
            std::env::remove_var("RELAY_TEST_SYSTEM_MD_EXPORT");
        }
    }

    #[tokio::test]
    async fn default_template_used_when_no_override_configured() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let assembler = PromptAssembler::new(config_for(dir.path()));

        let prompt = assembler.assemble(dir.path()).await.unwrap();
        assert!(prompt.starts_with(DEFAULT_TEMPLATE));
        assert!(prompt.contains("Operating system:"));
    }

    #[tokio::test]
    async fn explicit_override_path_is_used_when_present() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let override_path = dir.path().join("custom.md");
        tokio::fs::write(&override_path, "Custom instructions.")
            .await
            .unwrap();
        unsafe {
            std::env::set_var("RELAY_TEST_SYSTEM_MD", override_path.to_str().unwrap());
        }

        let assembler = PromptAssembler::new(config_for(dir.path()));
        let prompt = assembler.assemble(dir.path()).await.unwrap();
        assert!(prompt.starts_with("Custom instructions."));
        clear_env();
    }

    #[tokio::test]
    async fn missing_explicit_override_is_a_fatal_config_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        unsafe {
            std::env::set_var(
                "RELAY_TEST_SYSTEM_MD",
                dir.path().join("does-not-exist.md").to_str().unwrap(),
            );
        }

        let assembler = PromptAssembler::new(config_for(dir.path()));
        let result = assembler.assemble(dir.path()).await;
        assert!(matches!(result, Err(ConfigError::MissingOverrideFile(_))));
        clear_env();
    }

    #[tokio::test]
    async fn enabled_default_reads_config_dir_system_md() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("system.md"), "Default-path instructions.")
            .await
            .unwrap();
        unsafe {
            std::env::set_var("RELAY_TEST_SYSTEM_MD", "1");
        }

        let assembler = PromptAssembler::new(config_for(dir.path()));
        let prompt = assembler.assemble(dir.path()).await.unwrap();
        assert!(prompt.starts_with("Default-path instructions."));
        clear_env();
    }

    #[tokio::test]
    async fn export_hook_writes_template_then_continues_normally() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let export_path = dir.path().join("exported.md");
        unsafe {
            std::env::set_var("RELAY_TEST_SYSTEM_MD_EXPORT", export_path.to_str().unwrap());
        }

        let assembler = PromptAssembler::new(config_for(dir.path()));
        let prompt = assembler.assemble(dir.path()).await.unwrap();

        let exported = tokio::fs::read_to_string(&export_path).await.unwrap();
        assert_eq!(exported, DEFAULT_TEMPLATE);
        assert!(prompt.starts_with(DEFAULT_TEMPLATE));
        clear_env();
    }

    #[tokio::test]
    async fn user_memory_is_appended_when_present() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join(DEFAULT_MEMORY_FILE_NAME),
            "## Gemini Added Memories\n- likes terse output\n",
        )
        .await
        .unwrap();

        let assembler = PromptAssembler::new(config_for(dir.path()));
        let prompt = assembler.assemble(dir.path()).await.unwrap();
        assert!(prompt.contains("likes terse output"));
    }
}
