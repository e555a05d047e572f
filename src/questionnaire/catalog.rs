//! The eleven trip-planning questions, in the order they are asked.

use super::model::{Answer, DateRange, LocationAnswer, Question, QuestionId, TravelerGroup};

/// Default traveler groups: one adult, everyone else zero.
pub fn default_groups() -> Vec<TravelerGroup> {
    vec![
        TravelerGroup::new("Adults", "Ages 13 or above", 1),
        TravelerGroup::new("Older kids", "Ages 9 - 12", 0),
        TravelerGroup::new("Young kids", "Ages 5 - 8", 0),
        TravelerGroup::new("Toddlers", "Ages 0 - 4", 0),
        TravelerGroup::new("Pets", "", 0),
    ]
}

/// Build a fresh, unanswered question list.
pub fn default_questions() -> Vec<Question> {
    vec![
        Question::new(
            QuestionId::Destination,
            "Where would you like to go?",
            "location-outline",
            Answer::Location(LocationAnswer::default()),
        ),
        Question::new(
            QuestionId::Dates,
            "When are you planning to go?",
            "calendar-clear-outline",
            Answer::Dates(DateRange::default()),
        ),
        Question::new(
            QuestionId::Travelers,
            "Who's joining you on the trails?",
            "people-outline",
            Answer::Travelers(default_groups()),
        ),
        Question::new(
            QuestionId::Experience,
            "What's your hiking experience?",
            "footsteps-outline",
            Answer::Single(None),
        )
        .with_options(&["First-timer", "Done a few trails", "Regular hiker", "Trail expert"]),
        Question::new(
            QuestionId::Difficulty,
            "What difficulty level do you prefer?",
            "trending-up-outline",
            Answer::Single(None),
        )
        .with_options(&[
            "Easy - Gentle paths, perfect for relaxing",
            "Moderate - Some hills, nice workout",
            "Difficult - Challenging climbs ahead",
            "Expert - Serious elevation gain",
        ]),
        Question::new(
            QuestionId::Duration,
            "How long do you wanna hike?",
            "time-outline",
            Answer::Single(None),
        )
        .with_options(&["1-2 hours", "2-4 hours", "4-6 hours", "6+ hours"]),
        Question::new(
            QuestionId::Scenery,
            "What kind of scenery do you enjoy?",
            "heart-outline",
            Answer::Multi(Vec::new()),
        )
        .with_options(&[
            "Epic viewpoints",
            "Lakes and waterfalls",
            "Wildlife spotting",
            "Cool rock formations",
            "Dense forest trails",
            "Historical sites",
        ])
        .with_other(),
        Question::new(
            QuestionId::Terrain,
            "Preferred terrain?",
            "map-outline",
            Answer::Single(None),
        )
        .with_options(&["Flat", "Hilly", "Mountainous"])
        .with_other(),
        Question::new(
            QuestionId::TripFeatures,
            "Are you looking for trips with:",
            "trail-sign-outline",
            Answer::Multi(Vec::new()),
        )
        .with_options(&["Camping areas", "Mountain biking access", "Snow trails"])
        .with_other(),
        Question::new(
            QuestionId::MustHaves,
            "Any must-haves for your trip?",
            "shield-outline",
            Answer::Multi(Vec::new()),
        )
        .with_options(&[
            "Well-marked paths",
            "Cell service",
            "Easy parking",
            "Restrooms nearby",
            "Pet-friendly",
            "Shaded trails",
        ])
        .with_other(),
        Question::new(
            QuestionId::TimeOfDay,
            "Best time of the day for you?",
            "sunny-outline",
            Answer::Single(None),
        )
        .with_options(&[
            "Early bird - Catch the sunrise",
            "Morning - Beat the crowds",
            "Afternoon - When it warms up",
            "Evening - Chase the sunset",
        ]),
    ]
}
