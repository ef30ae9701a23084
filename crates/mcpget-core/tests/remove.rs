mod support;

use mcpget_core::config::AppConfigStore;
use mcpget_core::install::{InstallError, InstallRequest, Installer, StoreKind, remove_server};
use mcpget_core::ledger::LedgerStore;
use mcpget_core::types::{InstallSource, InstalledServer};

use support::{FailingAppConfig, FakeRegistry, Fixture, npx};

#[test]
fn remove_twice_succeeds_then_reports_not_installed() {
    let fx = Fixture::new();
    let registry = FakeRegistry::new();
    registry.publish("filesystem", "1.2.0", npx("fs"));
    let installer = Installer::new(&registry, &fx.desktop, &fx.settings);
    installer.install(InstallRequest::new("filesystem")).unwrap();

    let report = installer.remove("filesystem").unwrap();
    assert_eq!(report.version, "1.2.0");
    assert!(report.removed_from_app_config);

    let err = installer.remove("filesystem").unwrap_err();
    assert!(matches!(err, InstallError::NotInstalled(_)));

    assert!(fx.desktop.get("filesystem").is_none());
    assert!(fx.settings.get("filesystem").unwrap().is_none());
}

#[test]
fn remove_keeps_other_servers() {
    let fx = Fixture::new();
    let registry = FakeRegistry::new();
    registry.publish("alpha", "1.0.0", npx("alpha"));
    registry.publish("beta", "1.0.0", npx("beta"));
    let installer = Installer::new(&registry, &fx.desktop, &fx.settings);
    installer.install(InstallRequest::new("alpha")).unwrap();
    installer.install(InstallRequest::new("beta")).unwrap();

    installer.remove("alpha").unwrap();

    assert_eq!(fx.desktop.get("beta"), Some(npx("beta")));
    assert_eq!(
        fx.settings.get_all().unwrap().keys().collect::<Vec<_>>(),
        vec!["beta"]
    );
}

#[test]
fn remove_clears_ledger_when_desktop_entry_is_already_gone() {
    let fx = Fixture::new();
    let registry = FakeRegistry::new();
    registry.publish("filesystem", "1.2.0", npx("fs"));
    let installer = Installer::new(&registry, &fx.desktop, &fx.settings);
    installer.install(InstallRequest::new("filesystem")).unwrap();
    fx.desktop.delete("filesystem").unwrap();

    let report = installer.remove("filesystem").unwrap();

    assert!(!report.removed_from_app_config);
    assert!(fx.settings.get("filesystem").unwrap().is_none());
}

#[test]
fn remove_ignores_untracked_desktop_entries() {
    let fx = Fixture::new();
    fx.desktop.upsert("hand-added", &npx("thing")).unwrap();
    let registry = FakeRegistry::new();
    let installer = Installer::new(&registry, &fx.desktop, &fx.settings);

    let err = installer.remove("hand-added").unwrap_err();

    assert!(matches!(err, InstallError::NotInstalled(_)));
    assert_eq!(fx.desktop.get("hand-added"), Some(npx("thing")));
}

#[test]
fn desktop_failure_during_remove_keeps_ledger_entry() {
    let fx = Fixture::new();
    let registry = FakeRegistry::new();
    registry.publish("fs", "1.0.0", npx("fs"));
    Installer::new(&registry, &fx.desktop, &fx.settings)
        .install(InstallRequest::new("fs"))
        .unwrap();
    let desktop = FailingAppConfig::new(&fx.desktop);
    let installer = Installer::new(&registry, &desktop, &fx.settings);

    let err = installer.remove("fs").unwrap_err();

    assert!(matches!(
        err,
        InstallError::ConfigWriteFailed {
            store: StoreKind::AppConfig,
            ..
        }
    ));
    assert_eq!(fx.desktop.get("fs"), Some(npx("fs")));
    assert_eq!(fx.settings.get("fs").unwrap().unwrap().version, "1.0.0");
}

#[test]
fn remove_server_needs_no_registry() {
    let fx = Fixture::new();
    fx.desktop.upsert("local", &npx("local")).unwrap();
    fx.settings
        .put(InstalledServer::new(
            "local",
            "custom",
            npx("local"),
            InstallSource::Local,
        ))
        .unwrap();

    let report = remove_server(&fx.desktop, &fx.settings, "local").unwrap();

    assert_eq!(report.version, "custom");
    assert!(report.removed_from_app_config);
    assert!(fx.desktop.get("local").is_none());
    assert!(fx.settings.get("local").unwrap().is_none());
}
