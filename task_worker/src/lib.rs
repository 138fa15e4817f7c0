use engine::{grayscale, permutations_with_limit, Image, PixelBuffer, WorkRequest, WorkResponse};

/// Runs one request to completion. This is the whole life of a background
/// context: a single request in, a single response out.
pub fn handle_request(request: WorkRequest) -> WorkResponse {
    let kind = request.kind();
    let response = match request {
        WorkRequest::Permutations { size, limit } => {
            permutations_with_limit(size, limit).map(WorkResponse::Permutations)
        }
        WorkRequest::Grayscale {
            pixels,
            width,
            height,
            luminance,
        } => PixelBuffer::new(pixels)
            .and_then(|pixels| Image::new(width, height, pixels))
            .map(|image| WorkResponse::Grayscale(grayscale(image.pixels(), luminance))),
    };

    response.unwrap_or_else(|err| {
        tracing::debug!("{} request rejected: {}", kind, err);
        WorkResponse::Failed(err)
    })
}

#[cfg(target_arch = "wasm32")]
pub fn handle_message(data: Vec<u8>) -> Result<Vec<u8>, String> {
    let request = WorkRequest::from_bytes(&data);
    handle_request(request).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{EngineError, Luminance};

    #[test]
    fn permutations_request() {
        let response = handle_request(WorkRequest::Permutations { size: 2, limit: 10 });
        match response {
            WorkResponse::Permutations(set) => assert_eq!(set.into_inner(), vec![vec![2, 1], vec![1, 2]]),
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn negative_size_fails() {
        let response = handle_request(WorkRequest::Permutations { size: -4, limit: 10 });
        assert_eq!(response, WorkResponse::Failed(EngineError::NegativeSize(-4)));
    }

    #[test]
    fn grayscale_request() {
        let response = handle_request(WorkRequest::Grayscale {
            pixels: vec![0, 30, 60, 128],
            width: 1,
            height: 1,
            luminance: Luminance::Average,
        });
        match response {
            WorkResponse::Grayscale(pixels) => assert_eq!(pixels.as_bytes(), &[30, 30, 30, 128]),
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn grayscale_rejects_bad_buffers() {
        let misaligned = handle_request(WorkRequest::Grayscale {
            pixels: vec![0; 5],
            width: 1,
            height: 1,
            luminance: Luminance::Average,
        });
        assert_eq!(misaligned, WorkResponse::Failed(EngineError::MisalignedBuffer { len: 5 }));

        let mismatched = handle_request(WorkRequest::Grayscale {
            pixels: vec![0; 8],
            width: 1,
            height: 1,
            luminance: Luminance::Average,
        });
        assert_eq!(
            mismatched,
            WorkResponse::Failed(EngineError::DimensionMismatch {
                len: 8,
                width: 1,
                height: 1
            })
        );
    }
}
