use inidot::{CreateNewItems, EntryKind, IniContainer, IniValue, UpdateOptions};
use pretty_assertions::assert_eq;

#[test]
fn overlay_wins_where_it_speaks() -> miette::Result<()> {
    let mut base: IniContainer = "[a]\nx = 1\ny = 2\n".parse()?;
    let overlay: IniContainer = "[a]\nx = 9\nz = 3\n".parse()?;

    base.update(&overlay).unwrap();

    let a = base.get_section("a").unwrap();
    assert_eq!(a.get_value("x"), Some(&IniValue::Integer(9)));
    // Not mentioned by the overlay: untouched.
    assert_eq!(a.get_value("y"), Some(&IniValue::Integer(2)));
    // New keys are inserted by default.
    assert_eq!(a.get_value("z"), Some(&IniValue::Integer(3)));
    Ok(())
}

#[test]
fn layered_config_end_to_end() -> miette::Result<()> {
    let mut config: IniContainer = "\
# connection settings
[server]
host = 'localhost'
port = 8080
[[tls]]
enabled = False
"
    .parse()?;

    let user: IniContainer = "\
[server]
port = 443
[[tls]]
enabled = True
cert = '/etc/ssl/site.pem'
"
    .parse()?;

    config.update(&user).unwrap();

    assert_eq!(
        config.to_string(),
        "# connection settings\n\
         [server]\n\
         host = 'localhost'\n\
         port = 443\n\
         [[tls]]\n\
         enabled = True\n\
         cert = '/etc/ssl/site.pem'\n"
    );
    Ok(())
}

#[test]
fn strict_mode_only_updates_known_keys() -> miette::Result<()> {
    let mut base: IniContainer = "[a]\nx = 1\n".parse()?;
    let overlay: IniContainer = "[a]\nx = 9\ntypo = 3\n[misspelled]\ny = 1\n".parse()?;

    let strict = UpdateOptions {
        create_new_sections: false,
        create_new_items: CreateNewItems::None,
        update_comments: false,
    };
    base.update_with(&overlay, &strict).unwrap();

    let a = base.get_section("a").unwrap();
    assert_eq!(a.get_value("x"), Some(&IniValue::Integer(9)));
    assert!(!a.contains("typo"));
    assert!(base.get_section("misspelled").is_none());
    Ok(())
}

#[test]
fn item_creation_scoped_to_sections() -> miette::Result<()> {
    let mut base: IniContainer = "[plugins]\n[core]\ntimeout = 5\n".parse()?;
    let overlay: IniContainer =
        "[plugins]\nenabled = ['a', 'b']\n[core]\nextra = 1\n".parse()?;

    let options = UpdateOptions {
        create_new_items: CreateNewItems::InSections(vec!["plugins".into()]),
        ..Default::default()
    };
    base.update_with(&overlay, &options).unwrap();

    assert!(base.get_section("plugins").unwrap().contains("enabled"));
    assert!(!base.get_section("core").unwrap().contains("extra"));
    Ok(())
}

#[test]
fn conflicting_kinds_leave_base_untouched() -> miette::Result<()> {
    let mut base: IniContainer = "[a]\nx = 1\n[[nested]]\ny = 2\n".parse()?;
    let snapshot = base.clone();
    let overlay: IniContainer = "[a]\nx = 9\nnested = 'now a string'\n".parse()?;

    let err = base.update(&overlay).unwrap_err();
    assert_eq!(err.path, "a.nested");
    assert_eq!(err.base_kind, EntryKind::Section);
    assert_eq!(err.overlay_kind, EntryKind::Item);
    assert_eq!(base, snapshot);
    Ok(())
}

#[test]
fn merged_result_round_trips() -> miette::Result<()> {
    let mut base: IniContainer = "[a]\nx = 1\n".parse()?;
    let overlay: IniContainer = "[a]\n[[new_sub]]\nvalues = {1: 'one'}\n[b]\nflag = True\n".parse()?;

    base.update(&overlay).unwrap();
    let reparsed: IniContainer = base.to_string().parse()?;
    assert_eq!(reparsed, base);

    // The grafted subtree got correct depths for its new position.
    assert_eq!(
        base.get_section("a")
            .and_then(|a| a.get_section("new_sub"))
            .map(IniContainer::depth),
        Some(2)
    );
    Ok(())
}
