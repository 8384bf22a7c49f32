// ==========================================
// 分发场景集成测试
// ==========================================
// 职责: 以完整流程（排序 → 过滤 → 递补 → 交换 → 整理）验证典型场景
// ==========================================


use club_transfer::config::{AllocationConfig, CohortRestriction};
use club_transfer::domain::{FinalRank, Outcome};
use club_transfer::engine::AllocationError;
use club_transfer::AllocationOrchestrator;
use test_helpers::{allocate, allocate_with, quota, IndividualBuilder};

// ==========================================
// 连锁递补
// ==========================================

#[test]
fn test_vacated_slot_is_taken_by_next_applicant() {
    let records = vec![
        IndividualBuilder::new("U1").home("A").prefs(&["B"]).at_minute(0).build(),
        IndividualBuilder::new("U2").home("C").prefs(&["A"]).at_minute(1).build(),
    ];
    let quotas = vec![quota("A", 0), quota("B", 1), quota("C", 0)];

    let output = allocate(records, &quotas);

    let u1 = output.record("U1").unwrap();
    assert_eq!(u1.final_resource, "B");
    assert_eq!(u1.final_rank, FinalRank::Preference(1));
    assert_eq!(u1.outcome, Outcome::Changed);

    let u2 = output.record("U2").unwrap();
    assert_eq!(u2.final_resource, "A");
    assert_eq!(output.move_log.len(), 2);
    assert_eq!(output.move_log[0].individual_id, "U1");
    assert_eq!(output.move_log[1].individual_id, "U2");
}

#[test]
fn test_three_step_chain_moves_in_priority_order() {
    // 优先序: U3(C→A) > U2(D→C) > U1(A→B)；只有 B 有缺额
    let records = vec![
        IndividualBuilder::new("U3").home("C").prefs(&["A"]).at_minute(0).build(),
        IndividualBuilder::new("U2").home("D").prefs(&["C"]).at_minute(1).build(),
        IndividualBuilder::new("U1").home("A").prefs(&["B"]).at_minute(2).build(),
    ];
    let quotas = vec![quota("A", 0), quota("B", 1), quota("C", 0), quota("D", 0)];

    let output = allocate(records, &quotas);

    let moves: Vec<(&str, &str, &str)> = output
        .move_log
        .iter()
        .map(|m| {
            (
                m.individual_id.as_str(),
                m.from_resource.as_str(),
                m.to_resource.as_str(),
            )
        })
        .collect();
    assert_eq!(
        moves,
        vec![("U1", "A", "B"), ("U3", "C", "A"), ("U2", "D", "C")]
    );
    let iterations: Vec<usize> = output.move_log.iter().map(|m| m.iteration).collect();
    assert_eq!(iterations, vec![1, 2, 3]);
    assert!(output.swap_log.is_empty());
    assert_eq!(output.transferred().count(), 3);

    let remaining_d = output
        .remaining
        .iter()
        .find(|r| r.resource_name == "D")
        .unwrap();
    assert_eq!(remaining_d.remaining_capacity, 1);
}

#[test]
fn test_earlier_submission_has_priority_regardless_of_input_order() {
    let records = vec![
        IndividualBuilder::new("late").home("A").prefs(&["B"]).at_minute(30).build(),
        IndividualBuilder::new("no-time").home("A").prefs(&["B"]).no_time().build(),
        IndividualBuilder::new("early").home("A").prefs(&["B"]).at_minute(5).build(),
    ];

    let output = allocate(records, &[quota("B", 2)]);

    assert_eq!(output.record("early").unwrap().final_resource, "B");
    assert_eq!(output.record("late").unwrap().final_resource, "B");
    assert_eq!(output.record("no-time").unwrap().final_resource, "A");
    assert_eq!(output.record("no-time").unwrap().final_rank, FinalRank::NoTransfer);
    // 输出依优先序
    let ids: Vec<&str> = output.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["early", "late", "no-time"]);
}

#[test]
fn test_upgrade_to_better_choice_when_it_frees_up() {
    // V 先拿到第 2 志愿 B；X 离开 A 后，V 升级到第 1 志愿 A
    let records = vec![
        IndividualBuilder::new("V").home("H").prefs(&["A", "B"]).at_minute(0).build(),
        IndividualBuilder::new("X").home("A").prefs(&["C"]).at_minute(1).build(),
    ];
    let quotas = vec![quota("A", 0), quota("B", 1), quota("C", 1)];

    let output = allocate(records, &quotas);

    let v = output.record("V").unwrap();
    assert_eq!(v.final_resource, "A");
    assert_eq!(v.final_rank, FinalRank::Preference(1));

    let v_moves: Vec<usize> = output
        .move_log
        .iter()
        .filter(|m| m.individual_id == "V")
        .map(|m| m.preference_rank)
        .collect();
    assert_eq!(v_moves, vec![2, 1]);
}

// ==========================================
// 年级限制
// ==========================================

#[test]
fn test_blanket_ban_keeps_cohort_home() {
    let mut config = AllocationConfig::default();
    config.eligibility.first_group = CohortRestriction::ban_all();

    let records = vec![
        IndividualBuilder::new("G1a").class("101").home("A").prefs(&["B"]).at_minute(0).build(),
        IndividualBuilder::new("G1b").class("115").home("A").prefs(&["B", "C"]).at_minute(1).build(),
        IndividualBuilder::new("G3").class("301").home("A").prefs(&["B"]).at_minute(2).build(),
    ];
    let quotas = vec![quota("B", 5), quota("C", 5)];

    let output = allocate_with(config, records, &quotas);

    for id in ["G1a", "G1b"] {
        let r = output.record(id).unwrap();
        assert_eq!(r.final_resource, r.original_resource);
        assert_eq!(r.final_rank, FinalRank::NoTransfer);
    }
    assert_eq!(output.record("G3").unwrap().final_resource, "B");
}

#[test]
fn test_forbidden_resources_per_cohort() {
    let mut config = AllocationConfig::default();
    config.eligibility.first_group = CohortRestriction::forbid(&["ClubA"]);
    config.eligibility.second_group = CohortRestriction::forbid(&["ClubB"]);

    let records = vec![
        IndividualBuilder::new("S001").class("101").home("None").prefs(&["ClubA", "ClubB"]).at_minute(0).build(),
        IndividualBuilder::new("S002").class("201").home("None").prefs(&["ClubB", "ClubA"]).at_minute(1).build(),
        IndividualBuilder::new("S003").class("301").home("None").prefs(&["ClubA", "ClubB"]).at_minute(2).build(),
        IndividualBuilder::new("S004").class("115").home("None").prefs(&["ClubB", "ClubA"]).at_minute(3).build(),
    ];
    let quotas = vec![quota("ClubA", 10), quota("ClubB", 10)];

    let output = allocate_with(config, records, &quotas);

    // 被禁止的志愿移除后其余志愿前移，录取志愿序以过滤后列表计
    let s001 = output.record("S001").unwrap();
    assert_eq!(s001.final_resource, "ClubB");
    assert_eq!(s001.final_rank, FinalRank::Preference(1));

    assert_eq!(output.record("S002").unwrap().final_resource, "ClubA");
    assert_eq!(output.record("S003").unwrap().final_resource, "ClubA");
    assert_eq!(output.record("S004").unwrap().final_resource, "ClubB");
}

// ==========================================
// 交换最佳化
// ==========================================

#[test]
fn test_mutual_swap_without_spare_capacity() {
    let records = vec![
        IndividualBuilder::new("P").home("X").prefs(&["Y"]).at_minute(0).build(),
        IndividualBuilder::new("Q").home("Y").prefs(&["X"]).at_minute(1).build(),
    ];
    let quotas = vec![quota("X", 0), quota("Y", 0)];

    let output = allocate(records, &quotas);

    assert!(output.move_log.is_empty());
    assert_eq!(output.swap_log.len(), 1);
    assert_eq!(output.stats.swaps, 1);
    assert_eq!(output.record("P").unwrap().final_resource, "Y");
    assert_eq!(output.record("Q").unwrap().final_resource, "X");
    assert!(output
        .audit_lines()
        .contains(&"name-P (P) <-> name-Q (Q) : X <-> Y".to_string()));
}

// ==========================================
// 边界情况
// ==========================================

#[test]
fn test_unknown_preference_is_ignored() {
    let records = vec![IndividualBuilder::new("S1").home("A").prefs(&["Ghost", "B"]).build()];

    let output = allocate(records, &[quota("B", 1)]);

    let s1 = output.record("S1").unwrap();
    assert_eq!(s1.final_resource, "B");
    assert_eq!(s1.final_rank, FinalRank::Preference(2));
    assert!(output.remaining.iter().all(|r| r.resource_name != "Ghost"));
}

#[test]
fn test_missing_name_and_empty_home() {
    let records = vec![
        IndividualBuilder::new("S1").name("").prefs(&["B"]).build(),
        IndividualBuilder::new("S2").name("").home("").prefs(&["B"]).at_minute(1).build(),
    ];

    let output = allocate(records, &[quota("B", 1)]);

    let s1 = output.record("S1").unwrap();
    assert_eq!(s1.display_name, "");
    assert_eq!(s1.original_resource, "");
    assert_eq!(s1.final_resource, "B");
    assert_eq!(output.record("S2").unwrap().final_resource, "");
    // 空白原社团不列入名册
    assert_eq!(output.remaining.len(), 1);
}

#[test]
fn test_empty_input() {
    let output = allocate(Vec::new(), &[]);

    assert!(output.records.is_empty());
    assert!(output.remaining.is_empty());
    assert_eq!(output.stats.chain_iterations, 1);
    assert!(!output.stats.budget_exhausted);
}

#[test]
fn test_duplicate_ids_rejected_before_allocation() {
    let records = vec![
        IndividualBuilder::new("S1").home("A").build(),
        IndividualBuilder::new("S1").home("B").build(),
    ];

    let result = AllocationOrchestrator::new(AllocationConfig::default()).execute(records, &[]);

    assert!(matches!(result, Err(AllocationError::DuplicateIndividualId(id)) if id == "S1"));
}

#[test]
fn test_repeated_runs_are_deterministic() {
    let build = || {
        vec![
            IndividualBuilder::new("A1").home("X").prefs(&["Y", "Z"]).at_minute(0).build(),
            IndividualBuilder::new("A2").home("Y").prefs(&["X", "Z"]).at_minute(0).build(),
            IndividualBuilder::new("A3").home("Z").prefs(&["Y"]).at_minute(0).build(),
        ]
    };
    let quotas = vec![quota("Z", 1)];

    let first = allocate(build(), &quotas);
    let second = allocate(build(), &quotas);

    assert_eq!(first.records, second.records);
    assert_eq!(first.move_log, second.move_log);
    assert_eq!(first.swap_log, second.swap_log);
    assert_ne!(first.run_id, second.run_id);
}
