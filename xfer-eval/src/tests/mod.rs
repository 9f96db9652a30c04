mod corpus_io;
mod evaluator;
