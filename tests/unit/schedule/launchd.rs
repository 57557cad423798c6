use super::*;

fn agent() -> LaunchAgent {
    LaunchAgent::under_home(
        Path::new("/Users/me"),
        vec![
            "/usr/local/bin/himawari".to_string(),
            "--config".to_string(),
            "/Users/me/.config/himawari/config.json".to_string(),
            "run".to_string(),
        ],
        10,
    )
}

#[test]
fn paths_live_under_user_library() {
    let a = agent();
    assert_eq!(
        a.plist_path,
        Path::new("/Users/me/Library/LaunchAgents/com.himawari-live-wallpaper.plist")
    );
    assert_eq!(
        a.stderr_path,
        Path::new("/Users/me/Library/Logs/com.himawari-live-wallpaper.err")
    );
    assert_eq!(a.interval_secs, 600);
}

#[test]
fn plist_lists_arguments_in_order() {
    let plist = agent().render_plist();
    let run = plist.find("<string>run</string>").unwrap();
    let bin = plist.find("<string>/usr/local/bin/himawari</string>").unwrap();
    let cfg = plist.find("<string>--config</string>").unwrap();
    assert!(bin < cfg && cfg < run);
    assert!(plist.contains("<key>StartInterval</key>\n    <integer>600</integer>"));
    assert!(plist.contains("<key>RunAtLoad</key>\n    <true/>"));
    assert!(plist.contains("<string>com.himawari-live-wallpaper</string>"));
}

#[test]
fn plist_escapes_xml_in_arguments() {
    let mut a = agent();
    a.program_arguments = vec!["/tmp/a&b <c>".to_string()];
    assert!(
        a.render_plist()
            .contains("<string>/tmp/a&amp;b &lt;c&gt;</string>")
    );
}

#[test]
fn uninstall_without_plist_reports_not_installed() {
    let home = std::env::temp_dir().join(format!("himawari_launchd_{}", std::process::id()));
    let a = LaunchAgent::under_home(&home, vec!["x".to_string()], 10);
    assert!(!a.uninstall().unwrap());
}
