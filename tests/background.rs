use offload::{
    config::LocalConfig,
    engine::{permutations, EngineError, Image, Luminance, PixelBuffer, WorkRequest, WorkResponse},
    grayscale_offloaded, permutations_inline, permutations_offloaded, run_in_background, BackgroundTask, Error,
    Result, State,
};

#[tokio::test]
async fn inline_and_offloaded_agree() {
    for n in 0..=4 {
        let inline = permutations_inline(n, 10).unwrap();
        let offloaded = permutations_offloaded(n, 10).await.unwrap();
        assert_eq!(inline, offloaded, "modes differ for n = {}", n);
    }
}

#[tokio::test]
async fn offloaded_fixture() {
    let set = permutations_offloaded(3, 10).await.unwrap();
    assert_eq!(set, permutations(3).unwrap());
    assert_eq!(set.as_slice()[0], vec![3, 2, 1]);
    assert_eq!(set.as_slice()[5], vec![1, 2, 3]);
}

#[tokio::test]
async fn offloaded_negative_size_fails_fast() {
    let err = permutations_offloaded(-1, 10).await.unwrap_err();
    assert_eq!(err, Error::Engine(EngineError::NegativeSize(-1)));
}

#[tokio::test]
async fn grayscale_in_background() {
    let pixels = PixelBuffer::new(vec![255, 0, 0, 10, 0, 0, 255, 20, 9, 9, 9, 255, 1, 2, 3, 0]).unwrap();
    let image = Image::new(2, 2, pixels).unwrap();

    let out = grayscale_offloaded(image, Luminance::Average).await.unwrap();
    assert_eq!(
        out.as_bytes(),
        &[85, 85, 85, 10, 85, 85, 85, 20, 9, 9, 9, 255, 2, 2, 2, 0]
    );
}

#[tokio::test]
async fn grayscale_empty_image() {
    let image = Image::new(0, 0, PixelBuffer::default()).unwrap();
    let out = grayscale_offloaded(image, Luminance::Rec709).await.unwrap();
    assert!(out.as_bytes().is_empty());
}

struct Exploding;

impl BackgroundTask for Exploding {
    type Input = ();
    type Output = ();

    const NAME: &'static str = "exploding";

    fn request(_: ()) -> WorkRequest {
        WorkRequest::Permutations { size: 0, limit: 0 }
    }

    fn response(_: WorkResponse) -> Result<()> {
        Ok(())
    }

    fn execute(_: ()) -> Result<()> {
        panic!("background context died");
    }
}

#[tokio::test]
async fn dead_context_is_reported() {
    let err = run_in_background::<Exploding>(()).await.unwrap_err();
    assert_eq!(err, Error::Disconnected);
    assert!(err.is_background_failure());
}

#[tokio::test]
async fn state_renders_offloaded_permutations() {
    let mut state = State::new(LocalConfig::default());
    state.permute_offloaded(3);
    assert_eq!(state.permutation_message(), "Calculating in background...");
    assert!(state.permutation_results().is_empty());

    while state.is_busy() {
        state.wait_and_maintain().await;
    }

    assert_eq!(
        state.permutation_results(),
        &["3,2,1", "2,3,1", "2,1,3", "3,1,2", "1,3,2", "1,2,3"]
    );
    assert_eq!(state.permutation_message(), "");
    assert!(state.latest_errors().is_empty());
}

#[test]
fn state_renders_inline_permutations_and_resets() {
    let mut state = State::new(LocalConfig::default());
    state.permute_inline(2);
    assert_eq!(state.permutation_results(), &["2,1", "1,2"]);

    state.reset();
    assert!(state.permutation_results().is_empty());
    assert_eq!(state.permutation_message(), "");
}

#[test]
fn state_respects_configured_limit() {
    let config = LocalConfig {
        max_permutation_size: 3,
        ..Default::default()
    };
    let mut state = State::new(config);
    state.permute_inline(4);

    assert!(state.permutation_results().is_empty());
    assert_eq!(state.latest_errors().len(), 1);
    assert!(state.latest_errors()[0].contains("limit of 3"));
}

#[tokio::test]
async fn state_collects_converted_images() {
    let config = LocalConfig {
        luminance: Luminance::Rec601,
        ..Default::default()
    };
    let mut state = State::new(config);
    let image = Image::new(1, 1, PixelBuffer::new(vec![255, 255, 255, 7]).unwrap()).unwrap();

    state.grayscale("white", image);
    assert!(state.is_converting("white"));

    while state.is_busy() {
        state.wait_and_maintain().await;
    }

    assert!(!state.is_converting("white"));
    let converted = state.converted_image("white").unwrap();
    assert_eq!((converted.width, converted.height), (1, 1));
    assert_eq!(converted.pixels.as_bytes(), &[255, 255, 255, 7]);
}

#[tokio::test]
async fn concurrent_requests_each_complete() {
    let mut state = State::new(LocalConfig::default());
    state.permute_offloaded(2);
    state.permute_offloaded(1);
    state.grayscale("a", Image::new(1, 1, PixelBuffer::new(vec![0, 0, 0, 0]).unwrap()).unwrap());

    while state.is_busy() {
        state.wait_and_maintain().await;
    }

    // whichever permutation run finished last is what's rendered
    let results = state.permutation_results();
    assert!(results == ["2,1", "1,2"] || results == ["1"], "unexpected {:?}", results);
    assert!(state.converted_image("a").is_some());
}

#[tokio::test]
async fn reset_leaves_in_flight_work_alone() {
    let mut state = State::new(LocalConfig::default());
    state.permute_offloaded(3);
    state.reset();
    assert_eq!(state.permutation_message(), "");
    assert!(state.is_busy());

    while state.is_busy() {
        state.wait_and_maintain().await;
    }

    assert_eq!(state.permutation_results().len(), 6);
    assert_eq!(state.permutation_results()[0], "3,2,1");
    assert_eq!(state.permutation_message(), "");
}
