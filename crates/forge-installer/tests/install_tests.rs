//! End-to-end install runs against a temporary project directory.

use async_trait::async_trait;
use forge_core::{
    Error, FileSystem, Framework, InstallConfig, LocalFileSystem, MemoryFileSystem, Plugin,
    PluginName, PluginRegistry, ProjectContext,
};
use forge_installer::{
    InstallError, InstallOutcome, Installer, PluginStep, Result, StepContext, StepPhase,
    plans_from_json, steps_from_plans,
};
use forge_rules::{CompatibilityRule, CompatibilityValidator, RuleKind};
use forge_txn::TransactionManager;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const REGISTRY: &str = r#"[
    {"name": "zustand", "category": "state", "frameworks": ["react", "nextjs"]},
    {"name": "jotai", "category": "state", "frameworks": ["react"]},
    {"name": "tailwindcss", "category": "css", "frameworks": ["react", "vue"],
     "requires": ["postcss", "autoprefixer"]},
    {"name": "postcss", "category": "tooling", "frameworks": ["react", "vue"]},
    {"name": "autoprefixer", "category": "tooling", "frameworks": ["react", "vue"]},
    {"name": "eslint", "category": "tooling", "frameworks": ["react", "vue"]}
]"#;

const PLANS: &str = r#"[
    {"plugin": "zustand",
     "files": [{"action": "create", "path": "src/store/index.ts", "content": "export const useStore = {}"}],
     "configure": [{"action": "update", "path": "package.json", "content": "{\"dependencies\":{\"zustand\":\"^5\"}}"}]},
    {"plugin": "eslint",
     "files": [{"action": "create", "path": "eslint.config.js", "content": "export default []"}],
     "configure": [{"action": "delete", "path": ".eslintrc.json"}]}
]"#;

/// Reads every file under `root` into a map keyed by relative path.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, std::fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

fn project_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("package.json"), b"{\"name\":\"app\"}").unwrap();
    std::fs::write(temp.path().join(".eslintrc.json"), b"{\"extends\":[]}").unwrap();
    std::fs::create_dir_all(temp.path().join("src")).unwrap();
    std::fs::write(temp.path().join("src/main.tsx"), b"render()").unwrap();
    temp
}

fn installer(root: &Path, config: InstallConfig) -> (PluginRegistry, Installer) {
    let registry = PluginRegistry::from_json(REGISTRY).unwrap();
    let manager = Arc::new(TransactionManager::new(Arc::new(LocalFileSystem::new())).with_root(root));
    let installer = Installer::with_registry(manager, &registry, config).unwrap();
    (registry, installer)
}

/// Step that tracks a file, then fails.
#[derive(Debug)]
struct FailingStep {
    plugin: Plugin,
    phase: StepPhase,
}

#[async_trait]
impl PluginStep for FailingStep {
    fn plugin(&self) -> &Plugin {
        &self.plugin
    }

    async fn install(&self, ctx: &StepContext) -> Result<()> {
        ctx.create_file("src/partial.ts", b"half done".to_vec()).await?;
        if self.phase == StepPhase::Install {
            return Err(InstallError::step(ctx.plugin(), "template missing"));
        }
        Ok(())
    }

    async fn configure(&self, ctx: &StepContext) -> Result<()> {
        ctx.update_file("package.json", b"{}".to_vec()).await?;
        if self.phase == StepPhase::Configure {
            return Err(InstallError::step(ctx.plugin(), "config merge failed"));
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_successful_install_applies_all_changes() {
    let temp = project_dir();
    let root = temp.path();
    let (registry, installer) = installer(root, InstallConfig::default());

    let steps = steps_from_plans(&registry, plans_from_json(PLANS).unwrap()).unwrap();
    let report = installer
        .install(ProjectContext::new(root, Framework::React), steps)
        .await
        .unwrap();

    assert_eq!(report.outcome, InstallOutcome::Installed);
    assert!(report.is_success());
    assert_eq!(report.steps.len(), 4);
    assert_eq!(report.operations.len(), 4);
    assert!(report.failed_plugins().is_empty());

    assert_eq!(
        std::fs::read(root.join("src/store/index.ts")).unwrap(),
        b"export const useStore = {}"
    );
    assert_eq!(
        std::fs::read(root.join("package.json")).unwrap(),
        b"{\"dependencies\":{\"zustand\":\"^5\"}}"
    );
    assert!(root.join("eslint.config.js").exists());
    assert!(!root.join(".eslintrc.json").exists());

    // The transaction stays live so the install can still be reverted
    let id = report.transaction.unwrap();
    installer.manager().rollback(&id).await.unwrap();
    assert_eq!(
        std::fs::read(root.join("package.json")).unwrap(),
        b"{\"name\":\"app\"}"
    );
    assert!(root.join(".eslintrc.json").exists());
}

#[tokio::test]
async fn test_rejected_selection_touches_nothing() {
    let temp = project_dir();
    let root = temp.path();
    let before = snapshot(root);
    let (registry, installer) = installer(root, InstallConfig::default());

    // zustand + jotai violate the built-in state-manager exclusivity
    let plans = plans_from_json(
        r#"[{"plugin": "zustand", "files": [{"action": "create", "path": "a.ts", "content": "a"}]},
            {"plugin": "jotai", "files": [{"action": "create", "path": "b.ts", "content": "b"}]}]"#,
    )
    .unwrap();
    let steps = steps_from_plans(&registry, plans).unwrap();
    let report = installer
        .install(ProjectContext::new(root, Framework::React), steps)
        .await
        .unwrap();

    assert_eq!(report.outcome, InstallOutcome::Rejected);
    assert!(!report.validation.valid);
    assert!(report.steps.is_empty());
    assert_eq!(snapshot(root), before);
}

#[tokio::test]
async fn test_plugin_for_another_framework_is_rejected() {
    let temp = project_dir();
    let root = temp.path();
    let before = snapshot(root);
    let (registry, installer) = installer(root, InstallConfig::default());

    let steps = steps_from_plans(&registry, plans_from_json(PLANS).unwrap()).unwrap();
    let report = installer
        .install(ProjectContext::new(root, Framework::Vue), steps)
        .await
        .unwrap();

    assert_eq!(report.outcome, InstallOutcome::Rejected);
    assert!(report.transaction.is_none());
    let unsupported: Vec<&str> = report
        .validation
        .errors
        .iter()
        .filter(|e| e.kind == RuleKind::Unsupported)
        .flat_map(|e| e.plugins.iter().map(PluginName::as_str))
        .collect();
    assert_eq!(unsupported, vec!["zustand"]);
    assert_eq!(snapshot(root), before);
}

#[tokio::test]
async fn test_typescript_only_plugin_needs_typescript_project() {
    let fs = Arc::new(MemoryFileSystem::new());
    let manager = Arc::new(TransactionManager::new(fs.clone()).with_root("/app"));
    let installer =
        Installer::new(manager, CompatibilityValidator::default(), InstallConfig::default()).unwrap();
    let plugin = Plugin::builder("@tanstack/react-router")
        .frameworks([Framework::React])
        .requires_typescript(true)
        .build();
    let plans = plans_from_json(
        r#"[{"plugin": "@tanstack/react-router",
             "files": [{"action": "create", "path": "src/routes.tsx", "content": "export {}"}]}]"#,
    )
    .unwrap();
    let registry = PluginRegistry::new(vec![plugin]);

    let javascript = ProjectContext::new("/app", Framework::React);
    let report = installer
        .install(javascript, steps_from_plans(&registry, plans.clone()).unwrap())
        .await
        .unwrap();
    assert_eq!(report.outcome, InstallOutcome::Rejected);
    assert!(report.validation.errors[0].message.contains("TypeScript"));
    assert!(fs.is_empty().await);

    let typescript = ProjectContext::new("/app", Framework::React).with_typescript(true);
    let report = installer
        .install(typescript, steps_from_plans(&registry, plans).unwrap())
        .await
        .unwrap();
    assert_eq!(report.outcome, InstallOutcome::Installed);
    assert_eq!(fs.len().await, 1);
}

#[tokio::test]
async fn test_plugins_deleting_the_same_file_both_succeed() {
    let temp = project_dir();
    let root = temp.path();
    let (registry, installer) = installer(root, InstallConfig::default());

    let plans = plans_from_json(
        r#"[{"plugin": "eslint", "configure": [{"action": "delete", "path": ".eslintrc.json"}]},
            {"plugin": "postcss", "configure": [{"action": "delete", "path": ".eslintrc.json"}]}]"#,
    )
    .unwrap();
    let steps = steps_from_plans(&registry, plans).unwrap();
    let report = installer
        .install(ProjectContext::new(root, Framework::React), steps)
        .await
        .unwrap();

    assert_eq!(report.outcome, InstallOutcome::Installed);
    assert_eq!(report.operations.len(), 1);
    assert!(!root.join(".eslintrc.json").exists());

    let id = report.transaction.unwrap();
    assert_eq!(installer.manager().get_report(&id).await.unwrap().warning_count, 1);
    installer.manager().rollback(&id).await.unwrap();
    assert_eq!(
        std::fs::read(root.join(".eslintrc.json")).unwrap(),
        b"{\"extends\":[]}"
    );
}

#[tokio::test]
async fn test_missing_requirement_is_rejected() {
    let temp = project_dir();
    let root = temp.path();
    let (registry, installer) = installer(root, InstallConfig::default());

    let steps = steps_from_plans(
        &registry,
        plans_from_json(r#"[{"plugin": "tailwindcss"}]"#).unwrap(),
    )
    .unwrap();
    let report = installer
        .install(ProjectContext::new(root, Framework::React), steps)
        .await
        .unwrap();

    assert_eq!(report.outcome, InstallOutcome::Rejected);
    assert!(
        report
            .validation
            .errors
            .iter()
            .any(|e| e.missing.iter().any(|m| m.as_str() == "postcss"))
    );
}

#[tokio::test]
async fn test_failing_install_step_rolls_back_everything() {
    for phase in [StepPhase::Install, StepPhase::Configure] {
        let temp = project_dir();
        let root = temp.path();
        let before = snapshot(root);
        let (registry, installer) = installer(root, InstallConfig::default());

        let mut steps = steps_from_plans(&registry, plans_from_json(PLANS).unwrap()).unwrap();
        steps.push(Arc::new(FailingStep {
            plugin: registry.get("postcss").unwrap().clone(),
            phase,
        }));

        let report = installer
            .install(ProjectContext::new(root, Framework::React), steps)
            .await
            .unwrap();

        assert_eq!(report.outcome, InstallOutcome::RolledBack, "phase {phase}");
        let failed: Vec<&str> = report.failed_plugins().iter().map(|p| p.as_str()).collect();
        assert_eq!(failed, vec!["postcss"]);
        assert!(report.rollback_warnings.is_empty());
        assert_eq!(snapshot(root), before, "project changed after {phase} failure");
        assert!(installer.manager().active().await.is_empty());
    }
}

#[tokio::test]
async fn test_dry_run_reports_plan_without_writing() {
    let temp = project_dir();
    let root = temp.path();
    let before = snapshot(root);
    let config = InstallConfig::builder().dry_run(true).build().unwrap();
    let (registry, installer) = installer(root, config);

    let steps = steps_from_plans(&registry, plans_from_json(PLANS).unwrap()).unwrap();
    let report = installer
        .install(ProjectContext::new(root, Framework::React), steps)
        .await
        .unwrap();

    assert_eq!(report.outcome, InstallOutcome::DryRun);
    assert_eq!(report.operations.len(), 4);
    assert_eq!(snapshot(root), before);
    assert!(installer.manager().active().await.is_empty());
}

/// Step whose install never finishes in time.
#[derive(Debug)]
struct SlowStep(Plugin);

#[async_trait]
impl PluginStep for SlowStep {
    fn plugin(&self) -> &Plugin {
        &self.0
    }

    async fn install(&self, _ctx: &StepContext) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }

    async fn configure(&self, _ctx: &StepContext) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_step_timeout_rolls_back() {
    let fs = Arc::new(MemoryFileSystem::with_files([("/app/package.json", b"{}".to_vec())]));
    let manager = Arc::new(TransactionManager::new(fs.clone()).with_root("/app"));
    let config = InstallConfig::builder()
        .task_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let installer = Installer::new(manager, CompatibilityValidator::default(), config).unwrap();

    let plugin = Plugin::builder("slow").frameworks([Framework::React]).build();
    let report = installer
        .install(
            ProjectContext::new("/app", Framework::React),
            vec![Arc::new(SlowStep(plugin))],
        )
        .await
        .unwrap();

    assert_eq!(report.outcome, InstallOutcome::RolledBack);
    assert_eq!(report.summary.timed_out, 1);
    assert!(report.steps[0].error.as_deref().unwrap().contains("timed out"));
    assert_eq!(fs.len().await, 1);
}

/// Filesystem that refuses writes to one path.
#[derive(Debug)]
struct RefusingFileSystem {
    inner: MemoryFileSystem,
    refused: PathBuf,
}

#[async_trait]
impl FileSystem for RefusingFileSystem {
    async fn exists(&self, path: &Path) -> forge_core::Result<bool> {
        self.inner.exists(path).await
    }

    async fn read_file(&self, path: &Path) -> forge_core::Result<Vec<u8>> {
        self.inner.read_file(path).await
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> forge_core::Result<()> {
        if path == self.refused {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        self.inner.write_file(path, content).await
    }

    async fn delete_file(&self, path: &Path) -> forge_core::Result<()> {
        self.inner.delete_file(path).await
    }
}

#[tokio::test]
async fn test_commit_failure_is_reported_as_rolled_back() {
    let inner = MemoryFileSystem::with_files([("/app/package.json", b"{\"name\":\"app\"}".to_vec())]);
    let before = inner.snapshot().await;
    let fs = Arc::new(RefusingFileSystem {
        inner,
        refused: PathBuf::from("/app/vite.config.ts"),
    });
    let manager = Arc::new(TransactionManager::new(fs.clone()).with_root("/app"));
    let registry = PluginRegistry::from_json(REGISTRY).unwrap();
    let installer = Installer::new(
        manager,
        CompatibilityValidator::new(vec![CompatibilityRule::recommends(
            "eslint",
            ["prettier"],
            "formatting",
        )]),
        InstallConfig::default(),
    )
    .unwrap();

    let plans = plans_from_json(
        r#"[{"plugin": "eslint",
             "files": [{"action": "create", "path": "eslint.config.js", "content": "[]"}],
             "configure": [
                {"action": "update", "path": "package.json", "content": "{}"},
                {"action": "create", "path": "vite.config.ts", "content": "export default {}"}
             ]}]"#,
    )
    .unwrap();
    let report = installer
        .install(
            ProjectContext::new("/app", Framework::React),
            steps_from_plans(&registry, plans).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(report.outcome, InstallOutcome::RolledBack);
    assert!(report.error.as_deref().unwrap().contains("vite.config.ts"));
    assert!(report.failed_plugins().is_empty());
    assert_eq!(report.validation.suggestions.len(), 1);
    assert_eq!(fs.inner.snapshot().await, before);
}
