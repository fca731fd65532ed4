//! Property tests over the run state machine, spawn engine and save blob.

use std::collections::BTreeSet;

use proptest::prelude::*;

use bonus_runner::persistence::SaveData;
use bonus_runner::sim::{
    Control, EntityKind, EntityStore, GameState, GameStatus, Locale, Pattern, RunSnapshot,
    Spawner, StepKind, TickInput, World, tick,
};
use bonus_runner::{CarId, ShopItem, Tuning, lane_half, lane_to_x};

/// One thing a player or the host can do between ticks
#[derive(Debug, Clone)]
enum Action {
    Tick(f32, Vec<Control>),
    Damage,
    Letter(u8),
    Gem,
    Buy(usize),
    Restart,
    Menu,
    Start,
    CloseShop,
    Ability,
}

fn action() -> impl Strategy<Value = Action> {
    let control = prop_oneof![
        Just(Control::MoveLeft),
        Just(Control::MoveRight),
        Just(Control::Jump),
        Just(Control::UseAbility),
    ];
    prop_oneof![
        6 => (0.0f32..0.2, prop::collection::vec(control, 0..3))
            .prop_map(|(dt, controls)| Action::Tick(dt, controls)),
        2 => Just(Action::Damage),
        3 => (0u8..7).prop_map(Action::Letter),
        1 => Just(Action::Gem),
        1 => (0usize..13).prop_map(Action::Buy),
        1 => Just(Action::Restart),
        1 => Just(Action::Menu),
        1 => Just(Action::Start),
        1 => Just(Action::CloseShop),
        1 => Just(Action::Ability),
    ]
}

fn shop_item(i: usize) -> ShopItem {
    let abilities = [
        ShopItem::DoubleJump,
        ShopItem::MaxLife,
        ShopItem::Heal,
        ShopItem::Immortal,
    ];
    match abilities.get(i) {
        Some(item) => *item,
        None => ShopItem::Car(CarId::ALL[(i - abilities.len()) % CarId::ALL.len()]),
    }
}

fn apply(world: &mut World, action: &Action) {
    if let Action::Tick(dt, controls) = action {
        let input = TickInput {
            controls: controls.clone(),
            ..Default::default()
        };
        tick(world, &input, *dt);
        return;
    }
    let state = &mut world.state;
    match action {
        Action::Tick(..) => {}
        Action::Damage => state.take_damage(),
        Action::Letter(i) => {
            state.collect_letter(*i);
        }
        Action::Gem => state.collect_gem(50),
        Action::Buy(i) => {
            let item = shop_item(*i);
            state.buy_item(item, item.price());
        }
        Action::Restart => {
            state.restart_game();
        }
        Action::Menu => state.return_to_menu(),
        Action::Start => {
            state.start_game();
        }
        Action::CloseShop => state.close_shop(),
        Action::Ability => state.activate_immortality(),
    }
}

fn snapshot(level: u32, lane_count: u32) -> RunSnapshot {
    RunSnapshot {
        status: GameStatus::Playing,
        speed: 60.0,
        level,
        lane_count,
        collected_letters: Default::default(),
        is_level_transition: false,
        run_generation: 1,
    }
}

proptest! {
    #[test]
    fn lives_and_level_stay_in_bounds(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 1..200),
    ) {
        let mut world = World::new(seed, Tuning::default());
        world.state.start_game();
        let mut level = world.state.level;
        for action in &actions {
            let restarted = matches!(action, Action::Start);
            apply(&mut world, action);
            let state = &world.state;
            prop_assert!(state.lives <= state.max_lives);
            prop_assert!((1..=10).contains(&state.level));
            prop_assert!(state.collected_letters.len() <= 5);
            // only a fresh start may bring the level back down
            if !restarted {
                prop_assert!(state.level >= level);
            }
            level = state.level;
        }
    }

    #[test]
    fn collect_letter_is_idempotent(index in 0u8..5, repeats in 2usize..5) {
        let mut once = GameState::new(Tuning::default());
        once.start_game();
        once.collect_letter(index);

        let mut many = GameState::new(Tuning::default());
        many.start_game();
        for _ in 0..repeats {
            many.collect_letter(index);
        }

        prop_assert_eq!(once.collected_letters, many.collected_letters);
        prop_assert_eq!(once.speed, many.speed);
    }

    #[test]
    fn wall_always_leaves_a_rewarded_gap(seed in any::<u64>(), level in 2u32..=10) {
        let lanes = Tuning::lane_count_for_level(level);
        let mut spawner = Spawner::new(seed, &Tuning::default());
        let mut store = EntityStore::new();
        spawner.place_pattern(Pattern::Wall, &snapshot(level, lanes), -20.0, &mut store);

        let half = lane_half(lanes);
        let blocked: BTreeSet<i32> = (-half..=half)
            .filter(|&l| store.iter().any(|e| e.pos.x == lane_to_x(l)))
            .collect();
        prop_assert!(blocked.len() < lanes as usize);
        let all_obstacles = store
            .iter()
            .all(|e| matches!(e.kind, EntityKind::Obstacle { .. }));
        prop_assert!(all_obstacles);

        let reward = spawner.queue().last().copied();
        prop_assert!(reward.is_some());
        let reward = reward.unwrap();
        prop_assert_eq!(reward.kind, StepKind::Gem);
        prop_assert!(!blocked.contains(&reward.lane));
    }

    #[test]
    fn random_lanes_stay_in_range(
        seed in any::<u64>(),
        lanes in prop::sample::select(vec![3u32, 5, 7, 9]),
    ) {
        let mut spawner = Spawner::new(seed, &Tuning::default());
        let half = lane_half(lanes);
        for _ in 0..64 {
            let lane = spawner.random_lane(lanes);
            prop_assert!((-half..=half).contains(&lane));
        }
    }

    #[test]
    fn purchase_respects_credits(credits in 0u64..12_000, item in 0usize..13) {
        let mut state = GameState::new(Tuning::default());
        state.score = credits;
        let item = shop_item(item);
        let owned_before = state.owned_cars.len();

        let bought = state.buy_item(item, item.price());
        if item.price() > credits {
            prop_assert!(!bought);
            prop_assert_eq!(state.score, credits);
            prop_assert_eq!(state.owned_cars.len(), owned_before);
        } else if let ShopItem::Car(car) = item {
            if car == CarId::STARTER {
                prop_assert!(!bought);
            } else {
                prop_assert!(bought);
                prop_assert_eq!(state.score, credits - item.price());
                prop_assert_eq!(state.owned_cars.len(), owned_before + 1);
                prop_assert_eq!(state.equipped_car, car);
            }
        } else {
            prop_assert!(bought);
            prop_assert_eq!(state.score, credits - item.price());
            prop_assert_eq!(state.owned_cars.len(), owned_before);
        }
    }

    #[test]
    fn save_blob_round_trips(
        score in any::<u64>(),
        high_score in any::<u64>(),
        max_lives in 1u32..10,
        (has_double_jump, has_immortality) in any::<(bool, bool)>(),
        extra_cars in prop::sample::subsequence(CarId::ALL.to_vec(), 0..=CarId::ALL.len()),
        equipped in 0usize..9,
        energy in -5i64..2_000,
        (korean, is_premium, has_completed_tutorial) in any::<(bool, bool, bool)>(),
        day in prop::option::of(0u32..40_000),
    ) {
        let mut owned_cars: BTreeSet<CarId> = extra_cars.into_iter().collect();
        owned_cars.insert(CarId::STARTER);
        let equipped_car_id = *owned_cars.iter().nth(equipped % owned_cars.len()).unwrap();
        let data = SaveData {
            score,
            high_score,
            max_lives,
            has_double_jump,
            has_immortality,
            owned_cars,
            equipped_car_id,
            energy,
            locale: if korean { Locale::Ko } else { Locale::En },
            is_premium,
            has_completed_tutorial,
            last_attendance_date: day.map(|d| format!("day-{d}")),
        };

        let json = data.to_json().unwrap();
        let restored = SaveData::from_json(&json).unwrap();
        prop_assert_eq!(&restored, &data);

        let state = GameState::from_save(restored, Tuning::default());
        prop_assert_eq!(state.save_data(), data);
    }
}

#[test]
fn test_start_without_energy() {
    let mut state = GameState::new(Tuning::default());
    state.energy = 0;
    assert!(!state.start_game());
    assert_eq!(state.status, GameStatus::Menu);

    state.is_premium = true;
    assert!(state.start_game());
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.energy, 0);
}

#[test]
fn test_lane_steps_across_levels() {
    let mut state = GameState::new(Tuning::default());
    state.start_game();
    let mut seen = Vec::new();
    while state.level < 10 {
        for i in 0..5 {
            state.collect_letter(i);
        }
        assert!(state.is_level_transition);
        seen.push((state.level, state.lane_count));
        state.advance_clock(Tuning::default().transition_secs);
        assert!(!state.is_level_transition);
    }
    assert!(seen.contains(&(3, 5)));
    assert!(seen.contains(&(5, 7)));
    assert!(seen.contains(&(7, 9)));

    for i in 0..5 {
        state.collect_letter(i);
    }
    assert_eq!(state.status, GameStatus::Victory);
}
