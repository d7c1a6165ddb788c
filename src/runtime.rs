use once_cell::sync::Lazy;

/// Shared by the embedded gateway and every UI-initiated request.
pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("whatzapp-io")
        .build()
        .expect("Failed to build Tokio runtime")
});

pub fn spawn<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    RUNTIME.spawn(fut);
}

/// Detaches `fut` onto the runtime. Its result comes back on the GTK main loop
/// through the returned receiver; attach a handler there to observe failures.
pub fn run_to_main<T, E, Fut>(fut: Fut) -> glib::Receiver<Result<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    let (tx, rx) = glib::MainContext::channel(glib::Priority::default());
    spawn(async move {
        let _ = tx.send(fut.await);
    });
    rx
}
