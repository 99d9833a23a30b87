mod support;

use futures::executor::block_on;
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{desktop, simple_app, AppOptions};
use surface_contract::{AppMenuSpec, Key, Menu, MenuAction, MenuGroup, MenuItem, User};
use surface_runtime::{AppMenu, ApplicationState, KeyRouting};

fn alpha_with_alert() -> serde_json::Value {
    let mut descriptor = simple_app("io.bithead.alpha", "Alpha");
    descriptor["controllers"]["Alert"] = json!({ "modal": true });
    descriptor
}

#[test]
fn modals_stack_above_windows_and_take_keys_first() {
    let desktop = desktop();
    let alpha = desktop.install("io.bithead.alpha", alpha_with_alert());
    desktop.open(&alpha).expect("open alpha");
    let window = desktop.top_surface_of(&alpha);
    let modal = desktop.show(&alpha, "Alert");

    assert_eq!(desktop.manager.modal_stack(), vec![modal]);
    {
        let state = desktop.manager.state();
        let modal_z = state.stack().z_index(modal).expect("modal stacked");
        let window_z = state.stack().z_index(window).expect("window stacked");
        assert!(modal_z > window_z);
        assert_eq!(state.focused_surface(), Some(modal));
    }
    desktop.take_log();

    let routing = desktop.manager.dispatch_key(&Key::Enter);
    assert_eq!(
        routing,
        KeyRouting {
            target: Some(modal),
            delivered: true,
            prevent_default: true,
        }
    );
    desktop.manager.dispatch_key(&Key::from_name("Escape"));
    assert_eq!(desktop.take_log(), vec!["alpha.Alert:enter", "alpha.Alert:key Escape"]);

    desktop.manager.close_surface(modal);
    let routing = desktop.manager.dispatch_key(&Key::from_name("a"));
    assert_eq!(routing.target, Some(window));
    assert!(routing.delivered && !routing.prevent_default);
    assert_eq!(
        desktop.take_log(),
        vec!["alpha.Alert:view_will_unload", "alpha.Main:key a"]
    );
}

#[test]
fn sign_in_and_out_reach_every_shown_surface() {
    let desktop = desktop();
    let alpha = desktop.install("io.bithead.alpha", alpha_with_alert());
    let beta = desktop.install("io.bithead.beta", simple_app("io.bithead.beta", "Beta"));
    desktop.open(&alpha).expect("open alpha");
    desktop.show(&alpha, "Alert");
    desktop.open(&beta).expect("open beta");
    desktop.take_log();
    let user = User {
        id: 7,
        email: "ada@bithead.io".to_string(),
        full_name: "Ada".to_string(),
    };

    desktop.manager.sign_in_all_applications(&user);
    desktop.manager.sign_out_all_applications();

    let mut log = desktop.take_log();
    log.sort();
    assert_eq!(
        log,
        vec![
            "alpha.Alert:sign_in ada@bithead.io",
            "alpha.Alert:sign_out",
            "alpha.Main:sign_in ada@bithead.io",
            "alpha.Main:sign_out",
            "beta.Main:sign_in ada@bithead.io",
            "beta.Main:sign_out",
        ]
    );
}

#[test]
fn zoom_fills_the_desktop_and_restores_the_position() {
    let desktop = desktop();
    let alpha = desktop.install("io.bithead.alpha", alpha_with_alert());
    desktop.open(&alpha).expect("open alpha");
    let window = desktop.top_surface_of(&alpha);
    let before = desktop.manager.surface(window).and_then(|s| s.position);

    assert!(desktop.manager.toggle_zoom(window).expect("zoom in"));
    let zoomed = desktop.manager.surface(window).expect("surface");
    assert!(zoomed.fullscreen);
    assert_eq!(zoomed.position, None);

    assert!(!desktop.manager.toggle_zoom(window).expect("zoom out"));
    let restored = desktop.manager.surface(window).expect("surface");
    assert!(!restored.fullscreen);
    assert_eq!(restored.position, before);

    let modal = desktop.show(&alpha, "Alert");
    assert!(!desktop.manager.toggle_zoom(modal).expect("modals do not zoom"));
}

#[test]
fn default_menu_quits_and_shows_about() {
    let desktop = desktop();
    let mut descriptor = simple_app("io.bithead.alpha", "Alpha");
    descriptor["application"]["about"] = json!("About");
    descriptor["controllers"]["About"] = json!({ "singleton": true });
    let alpha = desktop.install("io.bithead.alpha", descriptor);
    desktop.open(&alpha).expect("open alpha");
    desktop.take_log();

    block_on(
        desktop
            .manager
            .activate_menu_item(&alpha, "Alpha", "About Alpha"),
    )
    .expect("about");
    assert!(desktop
        .take_log()
        .contains(&"alpha.About:view_did_load".to_string()));

    block_on(desktop.manager.activate_menu_item(&alpha, "Alpha", "Missing"))
        .expect("unknown items are ignored");
    block_on(desktop.manager.activate_menu_item(&alpha, "Alpha", "Quit Alpha")).expect("quit");
    assert_eq!(
        desktop.manager.application_state(&alpha),
        ApplicationState::Unloaded
    );
}

#[test]
fn delegate_menus_forward_commands() {
    let desktop = desktop();
    let menus = MenuGroup::new(vec![Menu::new("File")
        .with_item(MenuItem::new("Export", MenuAction::Command("export".to_string())))]);
    let alpha = desktop.install_with(
        "io.bithead.alpha",
        simple_app("io.bithead.alpha", "Alpha"),
        AppOptions {
            menus: Some(menus),
            ..AppOptions::default()
        },
    );
    desktop.open(&alpha).expect("open alpha");
    desktop.take_log();

    block_on(desktop.manager.activate_menu_item(&alpha, "File", "Export")).expect("export");

    assert_eq!(desktop.take_log(), vec!["alpha:command export"]);
}

#[test]
fn app_menu_affordances_switch_or_toggle() {
    let desktop = desktop();
    let alpha = desktop.install_with(
        "io.bithead.alpha",
        simple_app("io.bithead.alpha", "Alpha"),
        AppOptions {
            app_menu: Some(AppMenuSpec::Panel {
                markup: "<div>now playing</div>".to_string(),
            }),
            ..AppOptions::default()
        },
    );
    let beta = desktop.install("io.bithead.beta", simple_app("io.bithead.beta", "Beta"));
    desktop.open(&alpha).expect("open alpha");
    desktop.open(&beta).expect("open beta");

    desktop.manager.activate_app_menu(&alpha).expect("toggle panel");
    {
        let state = desktop.manager.state();
        let slot = state.os_bar().app_menu(&alpha).expect("panel slot");
        assert!(slot.visible);
        assert!(matches!(slot.menu, AppMenu::Panel { open: true, .. }));
    }
    assert_eq!(desktop.manager.active_application(), Some(beta.clone()));

    desktop.manager.switch_to(&alpha).expect("switch to alpha");
    {
        let state = desktop.manager.state();
        assert!(matches!(
            state.os_bar().app_menu(&alpha).map(|slot| &slot.menu),
            Some(AppMenu::Panel { open: false, .. })
        ));
        assert!(state.os_bar().app_menu(&beta).is_some_and(|slot| slot.visible));
    }

    desktop.manager.activate_app_menu(&beta).expect("switch via button");
    assert_eq!(desktop.manager.active_application(), Some(beta));
}
