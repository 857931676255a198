use state_machines::state_machine;

state_machine! {
    name: AnswerMachine,
    state: AnswerState,
    initial: Chunking,
    states: [Chunking, Querying, Aggregating, Synthesizing, Done, Failed],
    events {
        chunked { transition: { from: Chunking, to: Querying } }
        queried { transition: { from: Querying, to: Aggregating } }
        aggregated { transition: { from: Aggregating, to: Synthesizing } }
        synthesized { transition: { from: Synthesizing, to: Done } }
        abort {
            transition: { from: Chunking, to: Failed }
            transition: { from: Querying, to: Failed }
            transition: { from: Aggregating, to: Failed }
            transition: { from: Synthesizing, to: Failed }
        }
    }
}

pub fn chunking() -> AnswerMachine<(), Chunking> {
    AnswerMachine::new(())
}
