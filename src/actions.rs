use crate::{common::*, params};

/// Expands an action selector into the list of action names.
///
/// `"all"` selects every action, `"all_srnn"` selects the four actions of the
/// SRNN benchmark, and any single action name selects itself.
pub fn define_actions(name: &str) -> Fallible<Vec<String>> {
    let actions: Vec<String> = match name {
        "all" => params::ACTIONS.iter().map(|&action| action.into()).collect(),
        "all_srnn" => params::SRNN_ACTIONS
            .iter()
            .map(|&action| action.into())
            .collect(),
        action if params::ACTIONS.contains(&action) => vec![action.into()],
        other => bail!(r#"unrecognized action "{}""#, other),
    };
    Ok(actions)
}

/// Position of the action in the one-hot block.
pub fn action_index(actions: &[String], name: &str) -> Fallible<usize> {
    actions
        .iter()
        .position(|action| action == name)
        .ok_or_else(|| format_err!(r#"action "{}" is not selected"#, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_selects_every_action() {
        let actions = define_actions("all").unwrap();
        assert_eq!(actions.len(), 15);
        assert_eq!(actions[0], "walking");
        assert_eq!(actions[14], "walkingtogether");
    }

    #[test]
    fn srnn_subset() {
        let actions = define_actions("all_srnn").unwrap();
        assert_eq!(actions, vec!["walking", "eating", "smoking", "discussion"]);
    }

    #[test]
    fn single_action() {
        assert_eq!(define_actions("phoning").unwrap(), vec!["phoning"]);
        assert!(define_actions("jumping").is_err());
    }

    #[test]
    fn index_lookup() {
        let actions = define_actions("all_srnn").unwrap();
        assert_eq!(action_index(&actions, "smoking").unwrap(), 2);
        assert!(action_index(&actions, "posing").is_err());
    }
}
