use super::*;

#[test]
fn anomalies_accept_concurrent_appends() {
    let ctx = RunContext::new(UserDictionary::default());
    std::thread::scope(|s| {
        for t in 0..4 {
            let ctx = &ctx;
            s.spawn(move || {
                for i in 0..50 {
                    ctx.push_anomaly(&format!("line {t}-{i}"));
                    ctx.count_dropped();
                }
            });
        }
    });
    assert_eq!(ctx.anomaly_count(), 200);
    assert_eq!(ctx.dropped(), 200);

    let mut lines = ctx.into_anomalies();
    lines.sort();
    lines.dedup();
    assert_eq!(lines.len(), 200);
}

#[test]
fn fresh_context_is_empty() {
    let ctx = RunContext::new(UserDictionary::default());
    assert!(ctx.users().is_empty());
    assert_eq!(ctx.anomaly_count(), 0);
    assert_eq!(ctx.dropped(), 0);
}
