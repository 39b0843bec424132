use std::{cell::RefCell, rc::Rc};

use crate::{
    backend::{Surface, SurfaceFactory, SurfaceKind, SurfaceRequest},
    error::Error,
    scene::{Command, Scene, Viewport},
};

/// What a [`RecordingSurface`] has been asked to do.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Recording {
    /// Number of presented frames.
    pub frames: usize,
    /// Commands of the most recent frame.
    pub last: Vec<Command>,
    /// Every viewport passed to `resize`.
    pub resizes: Vec<Viewport>,
    /// Whether the surface has been dropped.
    pub dropped: bool,
}

/// A [`Surface`] that keeps the last presented commands in memory.
#[derive(Debug)]
pub struct RecordingSurface {
    kind: SurfaceKind,
    recording: Rc<RefCell<Recording>>,
}

impl RecordingSurface {
    /// Constructs a surface of `kind` and a handle to its recording.
    pub fn new(kind: SurfaceKind) -> (Self, Rc<RefCell<Recording>>) {
        let recording = Rc::new(RefCell::new(Recording::default()));
        (
            Self {
                kind,
                recording: recording.clone(),
            },
            recording,
        )
    }
}

impl Surface for RecordingSurface {
    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), Error> {
        self.recording.borrow_mut().resizes.push(viewport);
        Ok(())
    }

    fn present(&mut self, scene: &Scene) -> Result<(), Error> {
        let mut recording = self.recording.borrow_mut();
        recording.frames += 1;
        recording.last = scene.commands().to_vec();
        Ok(())
    }
}

impl Drop for RecordingSurface {
    fn drop(&mut self) {
        self.recording.borrow_mut().dropped = true;
    }
}

/// A [`SurfaceFactory`] handing out [`RecordingSurface`]s.
///
/// Kinds listed with [`refuse`](RecordingSurfaces::refuse) fail to create,
/// the way a browser without WebGL2 would.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurfaces {
    created: Rc<RefCell<Vec<(SurfaceRequest, Rc<RefCell<Recording>>)>>>,
    refused: Vec<SurfaceKind>,
}

impl RecordingSurfaces {
    /// Constructs a factory that creates every kind.
    pub fn new() -> Self {
        Default::default()
    }

    /// Makes requests for `kind` fail.
    pub fn refuse(mut self, kind: SurfaceKind) -> Self {
        self.refused.push(kind);
        self
    }

    /// Returns every request served so far with its recording.
    pub fn created(&self) -> Vec<(SurfaceRequest, Rc<RefCell<Recording>>)> {
        self.created.borrow().clone()
    }

    /// Returns the number of created surfaces that are still alive.
    pub fn live(&self) -> usize {
        self.created
            .borrow()
            .iter()
            .filter(|(_, recording)| !recording.borrow().dropped)
            .count()
    }
}

impl SurfaceFactory for RecordingSurfaces {
    fn create(&mut self, request: &SurfaceRequest) -> Result<Box<dyn Surface>, Error> {
        if self.refused.contains(&request.kind) {
            return Err(Error::UnableToRetrieveContext("refused"));
        }
        let (surface, recording) = RecordingSurface::new(request.kind);
        self.created.borrow_mut().push((*request, recording));
        Ok(Box::new(surface))
    }
}
