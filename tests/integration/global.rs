//! The process-wide registry and log sink.
//!
//! Both are global, so everything runs in one test to keep ordering fixed.

use guardstack::{dump, global, sink, Handle, LogSink, StackError};

#[test]
fn test_global_lifecycle_dump_and_shutdown() {
    let previous = sink::install(LogSink::memory());
    assert!(previous.is_none());

    let stk = global::create(2).unwrap();
    for v in [10, 20, 30] {
        global::push(stk, v).unwrap();
    }

    let report = dump!(stk).unwrap();
    assert!(report.starts_with(&format!("Stack[{}] \"stk\" from {}", stk, file!())));
    assert!(report.contains("capacity     = 4;"));
    assert!(report.contains("*[  2] = 30,"));
    assert!(report.contains("\t\t [  3] = 0,"));

    assert_eq!(global::pop(stk).unwrap(), 30);
    global::destroy(stk).unwrap();
    assert_eq!(global::pop(stk), Err(StackError::InvalidHandle(stk)));
    assert!(matches!(dump!(stk), Err(StackError::InvalidHandle(_))));

    let captured = sink::take().unwrap();
    assert_eq!(captured.captured(), Some(report.as_str()));

    // After shutdown every handle is gone and a fresh registry starts up.
    let survivor = global::create(1).unwrap();
    global::shutdown();
    assert_eq!(global::push(survivor, 1), Err(StackError::InvalidHandle(survivor)));
    assert_eq!(global::push(Handle::NONE, 1), Err(StackError::InvalidHandle(Handle::NONE)));
    global::shutdown();

    // A handle from before shutdown must not reach a container created after.
    let old = global::create(4).unwrap();
    global::push(old, 111).unwrap();
    global::shutdown();
    let fresh = global::create(4).unwrap();
    global::push(fresh, 222).unwrap();
    assert_ne!(old, fresh);
    assert_eq!(global::pop(old), Err(StackError::InvalidHandle(old)));
    assert_eq!(global::destroy(old), Err(StackError::InvalidHandle(old)));
    assert_eq!(global::pop(fresh), Ok(222));
    global::shutdown();
}
