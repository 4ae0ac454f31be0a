mod boundary;
mod nbest;
mod partial;
