//! What a build session counts and times

/// Things the builder tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildEvent {
    EntitiesCreated,
    ListenerNotifications,
    ScriptsEvaluated,
    BuildsFailed,
}

impl BuildEvent {
    pub const ALL: [BuildEvent; 4] = [
        BuildEvent::EntitiesCreated,
        BuildEvent::ListenerNotifications,
        BuildEvent::ScriptsEvaluated,
        BuildEvent::BuildsFailed,
    ];
}

/// Timed stages of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Script evaluation into definitions.
    Evaluate,
    /// Instantiating, wiring and registering entities.
    Construct,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Evaluate, Phase::Construct];
}
