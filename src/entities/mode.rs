use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum EditMode {
    Create,
    Update { route_id: String },
    Clone { source_route_id: String },
}

impl EditMode {
    pub fn name(&self) -> String {
        match self {
            Self::Create => "create".into(),
            Self::Update { route_id: _ } => "update".into(),
            Self::Clone { source_route_id: _ } => "clone".into(),
        }
    }

    /// Path segments of the route submission endpoint, relative to the API base.
    /// Segments are unescaped; the caller encodes them into a URL.
    pub fn endpoint(&self) -> Vec<&str> {
        match self {
            Self::Create | Self::Clone { source_route_id: _ } => vec!["api", "routes"],
            Self::Update { route_id } => vec!["api", "routes", route_id.as_str()],
        }
    }

    pub fn replaces_existing(&self) -> bool {
        matches!(self, Self::Update { route_id: _ })
    }
}

#[test]
fn update_targets_the_existing_route() {
    let mode = EditMode::Update {
        route_id: "r-42".into(),
    };

    assert_eq!(mode.endpoint(), vec!["api", "routes", "r-42"]);
    assert!(mode.replaces_existing());
}

#[test]
fn clone_posts_a_new_route() {
    let mode = EditMode::Clone {
        source_route_id: "r-42".into(),
    };

    assert_eq!(mode.endpoint(), vec!["api", "routes"]);
    assert!(!mode.replaces_existing());
    assert_eq!(mode.name(), "clone");
}
