//! End-to-end questionnaire flows through `FormEngine` with an in-memory
//! state tier and a scriptable fake of the remote profile store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use skincare_bot::UserId;
use skincare_bot::api::UserProduct;
use skincare_bot::error::ApiError;
use skincare_bot::profile::{ProfileStore, ProfileUpdate, StoredProfile};
use skincare_bot::questionnaire::{
    ConversationState, FormEngine, FormEvent, FormReply, IgnoreReason, InMemoryStateStore,
    OptionCode, Question, StateStore,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeProfiles {
    stored: std::sync::Mutex<HashMap<UserId, ProfileUpdate>>,
    saves: AtomicUsize,
    clears: AtomicUsize,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
    fail_clear: AtomicBool,
}

impl FakeProfiles {
    fn stored(&self, user: UserId) -> Option<ProfileUpdate> {
        self.stored.lock().unwrap().get(&user).cloned()
    }

    fn put(&self, user: UserId, profile: ProfileUpdate) {
        self.stored.lock().unwrap().insert(user, profile);
    }
}

fn unavailable(path: &str) -> ApiError {
    ApiError::Timeout {
        path: path.to_string(),
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn load_authoritative(&self, user: UserId) -> Result<Option<StoredProfile>, ApiError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(unavailable("/user/profile"));
        }
        Ok(self.stored(user).map(|p| StoredProfile {
            user_id: user,
            skin_type: p.skin_type,
            age: p.age,
            gender: p.gender,
            pregnancy: p.pregnancy,
            concern: p.concern,
            goal: p.goal,
            climate: p.climate,
            fitzpatrick: p.fitzpatrick,
            lifestyle: p.lifestyle,
            diet: p.diet,
            allergy: p.allergy,
            ..StoredProfile::default()
        }))
    }

    async fn save(&self, user: UserId, profile: &ProfileUpdate) -> Result<(), ApiError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(unavailable("/user/profile"));
        }
        self.put(user, profile.clone());
        Ok(())
    }

    async fn clear(&self, user: UserId) -> Result<(), ApiError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                path: "/user/profile/empty".to_string(),
                status: 503,
                body: "maintenance".to_string(),
            });
        }
        self.stored.lock().unwrap().remove(&user);
        Ok(())
    }

    async fn list_products(&self, _user: UserId) -> Result<Vec<UserProduct>, ApiError> {
        Ok(Vec::new())
    }

    async fn add_product(&self, _user: UserId, _product_id: i64) -> Result<(), ApiError> {
        Ok(())
    }

    async fn remove_product(&self, _user: UserId, _product_id: i64) -> Result<(), ApiError> {
        Ok(())
    }
}

struct Harness {
    engine: FormEngine,
    states: Arc<InMemoryStateStore>,
    profiles: Arc<FakeProfiles>,
}

fn harness() -> Harness {
    let states = Arc::new(InMemoryStateStore::new());
    let profiles = Arc::new(FakeProfiles::default());
    let engine = FormEngine::new(states.clone(), profiles.clone());
    Harness {
        engine,
        states,
        profiles,
    }
}

fn answer(code: &str) -> FormEvent {
    FormEvent::Answer(OptionCode::parse(code).expect("valid option code"))
}

const USER: UserId = 42;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_questionnaire_round_trip_with_male_skip() {
    let h = harness();

    let steps: Vec<(FormEvent, Question)> = vec![
        (FormEvent::StartForm, Question::SkinType),
        (answer("skin_dry"), Question::Age),
        (answer("age_25_34"), Question::Gender),
        (answer("gender_male"), Question::Concerns),
        (FormEvent::FreeText("acne".to_string()), Question::Goal),
        (answer("goal_hydration"), Question::Climate),
        (answer("climate_humid"), Question::Fitzpatrick),
        (answer("fitzpatrick_3"), Question::Lifestyle),
        (answer("lifestyle_computer"), Question::Diet),
        (answer("diet_none"), Question::Allergies),
    ];
    for (event, expected) in steps {
        let reply = h.engine.handle(USER, event.clone()).await.expect("no error");
        assert_eq!(reply, FormReply::Ask(expected), "after {event:?}");
    }

    let reply = h
        .engine
        .handle(USER, answer("allergies_none"))
        .await
        .expect("no error");
    let FormReply::Finished(profile) = reply else {
        panic!("expected finished questionnaire, got {reply:?}");
    };

    for question in Question::ALL {
        assert!(
            !profile.field(question).is_empty(),
            "{question} should be filled"
        );
    }
    assert_eq!(profile.skin_type, "Сухая");
    assert_eq!(profile.gender, "Мужчина");
    assert_eq!(profile.pregnancy, "Ничего из перечисленного");
    assert_eq!(profile.concern, "acne");
    assert_eq!(profile.allergy, "Нет аллергий");

    assert_eq!(h.profiles.stored(USER), Some(profile));

    let cached = h.states.load(USER).await.expect("state kept in memory");
    assert!(cached.is_idle());
    assert!(cached.is_complete());
}

#[tokio::test]
async fn non_male_answer_asks_about_pregnancy() {
    let h = harness();
    h.engine.handle(USER, FormEvent::StartForm).await.unwrap();
    h.engine.handle(USER, answer("skin_oily")).await.unwrap();
    h.engine.handle(USER, answer("age_18_24")).await.unwrap();

    let reply = h.engine.handle(USER, answer("gender_female")).await.unwrap();
    assert_eq!(reply, FormReply::Ask(Question::Pregnancy));

    let reply = h.engine.handle(USER, answer("lactation")).await.unwrap();
    assert_eq!(reply, FormReply::Ask(Question::Concerns));

    let state = h.engine.get_user_state(USER).await;
    assert_eq!(state.answer(Question::Pregnancy), Some("lactation"));
}

#[tokio::test]
async fn free_text_while_idle_is_dropped() {
    let h = harness();

    let reply = h
        .engine
        .handle(USER, FormEvent::FreeText("hello".to_string()))
        .await
        .unwrap();
    assert_eq!(
        reply,
        FormReply::Ignored(IgnoreReason::UnexpectedText { step: 0 })
    );
    assert_eq!(h.profiles.saves.load(Ordering::SeqCst), 0);
    assert!(h.states.is_empty());
}

#[tokio::test]
async fn answer_for_another_question_is_ignored() {
    let h = harness();
    h.engine.handle(USER, FormEvent::StartForm).await.unwrap();
    let saves_before = h.profiles.saves.load(Ordering::SeqCst);

    let reply = h.engine.handle(USER, answer("age_18_24")).await.unwrap();
    assert_eq!(
        reply,
        FormReply::Ignored(IgnoreReason::UnexpectedOption {
            step: 1,
            expected: Some(Question::SkinType),
            got: Question::Age,
        })
    );
    assert_eq!(h.engine.get_user_state(USER).await, ConversationState::started());
    assert_eq!(h.profiles.saves.load(Ordering::SeqCst), saves_before);
}

#[tokio::test]
async fn remote_failure_keeps_in_memory_progress() {
    let h = harness();
    h.profiles.fail_saves.store(true, Ordering::SeqCst);

    let reply = h.engine.handle(USER, FormEvent::StartForm).await.unwrap();
    assert_eq!(reply, FormReply::Ask(Question::SkinType));
    let reply = h.engine.handle(USER, answer("skin_dry")).await.unwrap();
    assert_eq!(reply, FormReply::Ask(Question::Age));

    let state = h.states.load(USER).await.expect("memory tier written");
    assert_eq!(state.step, 2);
    assert_eq!(state.answer(Question::SkinType), Some("skin_dry"));
    assert_eq!(h.profiles.saves.load(Ordering::SeqCst), 2, "mirror attempted");
    assert_eq!(h.profiles.stored(USER), None);
}

#[tokio::test]
async fn user_state_lookup_never_fails() {
    let h = harness();

    h.profiles.fail_loads.store(true, Ordering::SeqCst);
    assert_eq!(h.engine.get_user_state(USER).await, ConversationState::idle());

    h.profiles.fail_loads.store(false, Ordering::SeqCst);
    assert_eq!(h.engine.get_user_state(USER).await, ConversationState::idle());

    h.profiles.put(
        USER,
        ProfileUpdate {
            skin_type: "Сухая".to_string(),
            concern: "redness".to_string(),
            ..ProfileUpdate::default()
        },
    );
    let state = h.engine.get_user_state(USER).await;
    assert!(state.is_idle(), "remote-only loads never resume a step");
    assert_eq!(state.answer(Question::SkinType), Some("Сухая"));
    assert_eq!(state.answer(Question::Concerns), Some("redness"));
}

#[tokio::test]
async fn in_memory_state_wins_over_remote() {
    let h = harness();
    h.profiles.put(
        USER,
        ProfileUpdate {
            skin_type: "Жирная".to_string(),
            ..ProfileUpdate::default()
        },
    );
    let mut local = ConversationState::started();
    local.step = 3;
    local.skin_type = Some("skin_dry".to_string());
    h.states.save(USER, local.clone()).await;

    assert_eq!(h.engine.get_user_state(USER).await, local);
}

#[tokio::test]
async fn in_memory_state_survives_unreachable_remote() {
    let h = harness();
    let mut local = ConversationState::started();
    local.step = 4;
    local.skin_type = Some("skin_oily".to_string());
    local.gender = Some("gender_female".to_string());
    h.states.save(USER, local.clone()).await;
    h.profiles.fail_loads.store(true, Ordering::SeqCst);

    assert_eq!(h.engine.get_user_state(USER).await, local);
    assert_eq!(h.states.load(USER).await, Some(local));
}

#[tokio::test]
async fn finalize_is_idempotent() {
    let h = harness();
    let mut state = ConversationState::started();
    for (question, code) in [
        (Question::SkinType, "skin_normal"),
        (Question::Age, "age_35_44"),
        (Question::Gender, "gender_female"),
        (Question::Pregnancy, "pregnancy_ignore"),
        (Question::Concerns, "пигментация"),
        (Question::Goal, "goal_tone"),
        (Question::Climate, "climate_cold"),
        (Question::Fitzpatrick, "fitzpatrick_2"),
        (Question::Lifestyle, "lifestyle_active"),
        (Question::Diet, "diet_vegan"),
        (Question::Allergies, "allergies_fragrance"),
    ] {
        state.set_answer(question, code);
    }

    let first = h.engine.finalize(USER, state.clone()).await;
    let stored_first = h.profiles.stored(USER);
    let second = h.engine.finalize(USER, state).await;

    assert_eq!(first, second);
    assert_eq!(h.profiles.stored(USER), stored_first);
    assert_eq!(first.pregnancy, "Не учитывать");
    assert_eq!(first.concern, "пигментация");
}

#[tokio::test]
async fn retake_discards_cached_answers() {
    let h = harness();
    h.engine.handle(USER, FormEvent::StartForm).await.unwrap();
    h.engine.handle(USER, answer("skin_dry")).await.unwrap();
    h.engine.handle(USER, answer("age_25_34")).await.unwrap();

    let reply = h.engine.handle(USER, FormEvent::Retake).await.unwrap();
    assert_eq!(reply, FormReply::Ask(Question::SkinType));
    assert_eq!(
        h.states.load(USER).await,
        Some(ConversationState::started())
    );
}

#[tokio::test]
async fn delete_clears_both_tiers() {
    let h = harness();
    h.engine.handle(USER, FormEvent::StartForm).await.unwrap();
    h.engine.handle(USER, answer("skin_dry")).await.unwrap();

    let reply = h
        .engine
        .handle(USER, FormEvent::DeleteQuestionnaire)
        .await
        .unwrap();
    assert_eq!(reply, FormReply::Deleted);
    assert!(h.states.load(USER).await.is_none());
    assert_eq!(h.profiles.stored(USER), None);
    assert_eq!(h.profiles.clears.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn delete_reports_remote_failure() {
    let h = harness();
    h.profiles.fail_clear.store(true, Ordering::SeqCst);
    h.engine.handle(USER, FormEvent::StartForm).await.unwrap();

    let err = h
        .engine
        .handle(USER, FormEvent::DeleteQuestionnaire)
        .await
        .expect_err("remote clear failed");
    assert!(matches!(err, ApiError::Status { status: 503, .. }));
    assert!(
        h.states.load(USER).await.is_none(),
        "local entry is dropped regardless"
    );
}

#[tokio::test]
async fn users_progress_independently() {
    let h = Arc::new(harness());

    let mut tasks = Vec::new();
    for user in 1..=20 {
        let h = Arc::clone(&h);
        tasks.push(tokio::spawn(async move {
            h.engine.handle(user, FormEvent::StartForm).await.unwrap();
            let code = if user % 2 == 0 { "skin_dry" } else { "skin_oily" };
            h.engine.handle(user, answer(code)).await.unwrap()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), FormReply::Ask(Question::Age));
    }

    assert_eq!(h.states.len(), 20);
    let even = h.states.load(2).await.unwrap();
    let odd = h.states.load(3).await.unwrap();
    assert_eq!(even.answer(Question::SkinType), Some("skin_dry"));
    assert_eq!(odd.answer(Question::SkinType), Some("skin_oily"));
    assert_eq!(h.engine.active_users(), 0, "per-user locks are released");
}

#[tokio::test]
async fn same_user_duplicate_answers_apply_once() {
    let h = Arc::new(harness());
    h.engine.handle(USER, FormEvent::StartForm).await.unwrap();

    // Two presses of the same button race; the second sees step 2 and is ignored.
    let a = {
        let h = Arc::clone(&h);
        tokio::spawn(async move { h.engine.handle(USER, answer("skin_dry")).await.unwrap() })
    };
    let b = {
        let h = Arc::clone(&h);
        tokio::spawn(async move { h.engine.handle(USER, answer("skin_dry")).await.unwrap() })
    };
    let replies = [a.await.unwrap(), b.await.unwrap()];

    let asked = replies
        .iter()
        .filter(|r| **r == FormReply::Ask(Question::Age))
        .count();
    let ignored = replies
        .iter()
        .filter(|r| matches!(r, FormReply::Ignored(_)))
        .count();
    assert_eq!((asked, ignored), (1, 1));
    assert_eq!(h.states.load(USER).await.unwrap().step, 2);
    assert_eq!(h.engine.active_users(), 0);
}
